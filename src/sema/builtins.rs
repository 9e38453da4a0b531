//! Names provided by the evaluator without any binding in source.

/// Primops reachable without the `builtins.` prefix.
pub const GLOBAL_PRIMOPS: &[&str] = &[
    "abort",
    "baseNameOf",
    "break",
    "derivation",
    "derivationStrict",
    "dirOf",
    "fetchGit",
    "fetchMercurial",
    "fetchTarball",
    "fetchTree",
    "fromTOML",
    "import",
    "isNull",
    "map",
    "placeholder",
    "removeAttrs",
    "scopedImport",
    "throw",
    "toString",
];

/// Primops only reachable as `builtins.<name>` or `__<name>`.
pub const PREFIXED_PRIMOPS: &[&str] = &[
    "add",
    "addDrvOutputDependencies",
    "addErrorContext",
    "all",
    "any",
    "appendContext",
    "attrNames",
    "attrValues",
    "bitAnd",
    "bitOr",
    "bitXor",
    "catAttrs",
    "ceil",
    "compareVersions",
    "concatLists",
    "concatMap",
    "concatStringsSep",
    "convertHash",
    "deepSeq",
    "div",
    "elem",
    "elemAt",
    "fetchClosure",
    "fetchurl",
    "filter",
    "filterSource",
    "floor",
    "foldl'",
    "fromJSON",
    "functionArgs",
    "genList",
    "genericClosure",
    "getAttr",
    "getContext",
    "getEnv",
    "getFlake",
    "groupBy",
    "hasAttr",
    "hasContext",
    "hashFile",
    "hashString",
    "head",
    "intersectAttrs",
    "isAttrs",
    "isBool",
    "isFloat",
    "isFunction",
    "isInt",
    "isList",
    "isPath",
    "isString",
    "length",
    "lessThan",
    "listToAttrs",
    "mapAttrs",
    "match",
    "mul",
    "outputOf",
    "parseDrvName",
    "partition",
    "path",
    "pathExists",
    "readDir",
    "readFile",
    "readFileType",
    "replaceStrings",
    "seq",
    "sort",
    "split",
    "splitVersion",
    "storePath",
    "stringLength",
    "sub",
    "substring",
    "tail",
    "toFile",
    "toJSON",
    "toPath",
    "toXML",
    "trace",
    "traceVerbose",
    "tryEval",
    "typeOf",
    "unsafeDiscardOutputDependency",
    "unsafeDiscardStringContext",
    "unsafeGetAttrPos",
    "warn",
    "zipAttrsWith",
];

/// Global constants.
pub const CONSTANTS: &[&str] = &[
    "true",
    "false",
    "null",
    "__currentSystem",
    "__currentTime",
    "__langVersion",
    "__nixPath",
    "__nixVersion",
    "__storeDir",
];

/// Outcome of looking a name up among the primops.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrimOpLookup {
    /// Available globally.
    Found,
    /// Exists, but only behind the `builtins.` prefix.
    PrefixedFound,
    NotFound,
}

pub fn lookup_primop(name: &str) -> PrimOpLookup {
    if GLOBAL_PRIMOPS.contains(&name) {
        PrimOpLookup::Found
    } else if PREFIXED_PRIMOPS.contains(&name) {
        PrimOpLookup::PrefixedFound
    } else {
        PrimOpLookup::NotFound
    }
}

pub fn is_constant(name: &str) -> bool {
    CONSTANTS.contains(&name)
}

/// Whether `builtins.<name>` names a constant rather than a primop, e.g.
/// `builtins.currentSystem` or `builtins.true`.
pub fn is_builtins_constant(name: &str) -> bool {
    if name.starts_with('_') {
        return false;
    }
    name == "builtins"
        || CONSTANTS
            .iter()
            .any(|constant| *constant == name || constant.strip_prefix("__") == Some(name))
}

/// Every name of the global frame, in declaration order.
pub fn global_names() -> impl Iterator<Item = String> {
    GLOBAL_PRIMOPS
        .iter()
        .map(|name| (*name).to_string())
        .chain(PREFIXED_PRIMOPS.iter().map(|name| format!("__{name}")))
        .chain(CONSTANTS.iter().map(|name| (*name).to_string()))
        .chain(["builtins".to_string(), "__curPos".to_string()])
}
