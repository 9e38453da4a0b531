//! Bytes → tree.

use smol_str::SmolStr;

use crate::base::{TextRange, TextSize};
use crate::syntax::{AttrName, Node, NodeId, NodeKind, StringPart, SyntaxTree};

use super::error::DecodeError;
use super::tag;
use super::{MAGIC, NONE, VERSION};

/// Decode a tree produced by [`encode`](super::encode).
///
/// Every child id must be smaller than the id of the node referring to it,
/// and no node may be claimed by two parents. A decoded tree is therefore
/// acyclic and shares no subtrees.
pub fn decode(bytes: &[u8]) -> Result<SyntaxTree, DecodeError> {
    let mut reader = Reader::new(bytes);

    let magic = reader.take(MAGIC.len(), "magic")?;
    if magic != MAGIC {
        return Err(DecodeError::BadMagic {
            found: magic.to_vec(),
        });
    }
    let version = reader.u16("version")?;
    if version != VERSION {
        return Err(DecodeError::UnsupportedVersion {
            found: version,
            supported: VERSION,
        });
    }
    let count = reader.u32("node count")?;
    let root = reader.u32("root")?;

    // Each node takes at least nine bytes; don't trust the count blindly.
    let mut nodes = Vec::with_capacity((count as usize).min(reader.remaining() / 9));
    for index in 0..count {
        nodes.push(reader.node(index)?);
    }
    if reader.remaining() > 0 {
        return Err(DecodeError::TrailingBytes(reader.remaining()));
    }
    if root >= count {
        return Err(DecodeError::RootOutOfRange { root, count });
    }

    tracing::debug!("[BYTECODE] decoded {} nodes ({} bytes)", count, bytes.len());
    Ok(SyntaxTree::from_parts(nodes, NodeId::new(root)))
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
    /// One flag per node read so far: already referenced by a parent.
    claimed: Vec<bool>,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            pos: 0,
            claimed: Vec::new(),
        }
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    fn take(&mut self, len: usize, what: &'static str) -> Result<&'a [u8], DecodeError> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.bytes.len())
            .ok_or(DecodeError::eof(self.pos, what))?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn array<const N: usize>(&mut self, what: &'static str) -> Result<[u8; N], DecodeError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N, what)?);
        Ok(out)
    }

    fn u8(&mut self, what: &'static str) -> Result<u8, DecodeError> {
        Ok(self.array::<1>(what)?[0])
    }

    fn u16(&mut self, what: &'static str) -> Result<u16, DecodeError> {
        self.array(what).map(u16::from_le_bytes)
    }

    fn u32(&mut self, what: &'static str) -> Result<u32, DecodeError> {
        self.array(what).map(u32::from_le_bytes)
    }

    fn bool(&mut self, what: &'static str) -> Result<bool, DecodeError> {
        Ok(self.u8(what)? != 0)
    }

    fn str(&mut self) -> Result<SmolStr, DecodeError> {
        let len = self.u32("string length")? as usize;
        let offset = self.pos;
        let bytes = self.take(len, "string")?;
        std::str::from_utf8(bytes)
            .map(SmolStr::from)
            .map_err(|_| DecodeError::InvalidUtf8 { offset })
    }

    /// A child id of node `parent`.
    fn id(&mut self, parent: u32) -> Result<NodeId, DecodeError> {
        let child = self.u32("node id")?;
        if child >= parent {
            return Err(DecodeError::DanglingChild {
                node: parent,
                child,
            });
        }
        match self.claimed.get_mut(child as usize) {
            Some(claimed) if !*claimed => *claimed = true,
            _ => {
                return Err(DecodeError::SharedChild {
                    node: parent,
                    child,
                });
            }
        }
        Ok(NodeId::new(child))
    }

    fn opt_id(&mut self, parent: u32) -> Result<Option<NodeId>, DecodeError> {
        let offset = self.pos;
        match self.u32("node id")? {
            NONE => Ok(None),
            _ => {
                self.pos = offset;
                self.id(parent).map(Some)
            }
        }
    }

    fn ids(&mut self, parent: u32) -> Result<Vec<NodeId>, DecodeError> {
        let len = self.u32("id count")? as usize;
        let mut ids = Vec::with_capacity(len.min(self.remaining() / 4));
        for _ in 0..len {
            ids.push(self.id(parent)?);
        }
        Ok(ids)
    }

    fn node(&mut self, index: u32) -> Result<Node, DecodeError> {
        self.claimed.push(false);
        let tag_offset = self.pos;
        let tag = self.u8("node tag")?;
        let start = self.u32("range start")?;
        let end = self.u32("range end")?;
        if start > end {
            return Err(DecodeError::InvalidRange {
                node: index,
                start,
                end,
            });
        }
        let range = TextRange::new(TextSize::from(start), TextSize::from(end));
        let kind = self.kind(tag, tag_offset, index)?;
        Ok(Node { kind, range })
    }

    fn kind(&mut self, node_tag: u8, offset: usize, n: u32) -> Result<NodeKind, DecodeError> {
        let kind = match node_tag {
            tag::NULL => NodeKind::Null,
            tag::INT => NodeKind::Int(i64::from_le_bytes(self.array("int")?)),
            tag::FLOAT => NodeKind::Float(f64::from_bits(u64::from_le_bytes(self.array("float")?))),
            tag::PATH => NodeKind::Path(self.str()?),
            tag::STRING => {
                let len = self.u32("part count")? as usize;
                let mut parts = Vec::with_capacity(len.min(self.remaining()));
                for _ in 0..len {
                    let part_offset = self.pos;
                    let part = match self.u8("string part")? {
                        tag::part::LITERAL => StringPart::Literal(self.str()?),
                        tag::part::INTERPOLATION => StringPart::Interpolation(self.id(n)?),
                        other => return Err(DecodeError::unknown_tag("string part", other, part_offset)),
                    };
                    parts.push(part);
                }
                NodeKind::String(parts)
            }
            tag::VAR => NodeKind::Var(self.str()?),
            tag::IDENTIFIER => NodeKind::Identifier(self.str()?),
            tag::ATTR_NAME => {
                let name_offset = self.pos;
                let name = match self.u8("attribute name")? {
                    tag::attr_name::IDENT => AttrName::Ident(self.str()?),
                    tag::attr_name::STRING => AttrName::String(self.id(n)?),
                    tag::attr_name::INTERPOLATION => AttrName::Interpolation(self.id(n)?),
                    other => return Err(DecodeError::unknown_tag("attribute name", other, name_offset)),
                };
                NodeKind::AttrName(name)
            }
            tag::ATTR_PATH => NodeKind::AttrPath(self.ids(n)?),
            tag::BINDING => NodeKind::Binding {
                path: self.id(n)?,
                value: self.id(n)?,
            },
            tag::INHERIT => NodeKind::Inherit {
                from: self.opt_id(n)?,
                names: self.ids(n)?,
            },
            tag::ATTRS => NodeKind::Attrs {
                rec: self.bool("rec flag")?,
                bindings: self.ids(n)?,
            },
            tag::LET => NodeKind::Let {
                bindings: self.ids(n)?,
                body: self.id(n)?,
            },
            tag::WITH => NodeKind::With {
                subject: self.id(n)?,
                body: self.id(n)?,
            },
            tag::LAMBDA => NodeKind::Lambda {
                arg: self.opt_id(n)?,
                formals: self.opt_id(n)?,
                body: self.id(n)?,
            },
            tag::FORMALS => NodeKind::Formals {
                formals: self.ids(n)?,
                ellipsis: self.bool("ellipsis flag")?,
            },
            tag::FORMAL => NodeKind::Formal {
                name: self.id(n)?,
                default: self.opt_id(n)?,
            },
            tag::SELECT => NodeKind::Select {
                expr: self.id(n)?,
                path: self.id(n)?,
                default: self.opt_id(n)?,
            },
            tag::HAS_ATTR => NodeKind::HasAttr {
                expr: self.id(n)?,
                path: self.id(n)?,
            },
            tag::IF => NodeKind::If {
                cond: self.id(n)?,
                then_branch: self.id(n)?,
                else_branch: self.id(n)?,
            },
            tag::ASSERT => NodeKind::Assert {
                cond: self.id(n)?,
                body: self.id(n)?,
            },
            tag::LIST => NodeKind::List(self.ids(n)?),
            tag::CALL => NodeKind::Call {
                func: self.id(n)?,
                args: self.ids(n)?,
            },
            tag::UNARY_OP => {
                let op_offset = self.pos;
                let byte = self.u8("unary operator")?;
                let op = tag::decode_unary_op(byte)
                    .ok_or(DecodeError::unknown_tag("unary operator", byte, op_offset))?;
                NodeKind::UnaryOp {
                    op,
                    operand: self.id(n)?,
                }
            }
            tag::BINARY_OP => {
                let op_offset = self.pos;
                let byte = self.u8("binary operator")?;
                let op = tag::decode_binary_op(byte)
                    .ok_or(DecodeError::unknown_tag("binary operator", byte, op_offset))?;
                NodeKind::BinaryOp {
                    op,
                    lhs: self.id(n)?,
                    rhs: self.id(n)?,
                }
            }
            tag::PAREN => NodeKind::Paren(self.id(n)?),
            other => return Err(DecodeError::unknown_tag("node", other, offset)),
        };
        Ok(kind)
    }
}
