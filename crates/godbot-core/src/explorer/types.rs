use serde::Deserialize;

/// One record of the remote compiler list (`/api/compilers/<lang>`).
#[derive(Clone, Debug, Deserialize)]
pub struct CompilerListing {
    pub id: String,
    #[serde(default)]
    pub semver: String,
    #[serde(rename = "name")]
    pub title: String,
    pub lang: String,
    #[serde(rename = "instructionSet", default)]
    pub instruction_set: String,
}

/// A compile invocation against one resolved compiler.
///
/// The adapter adds the fixed payload parts (language, filters, default
/// library set) when it builds the wire request.
#[derive(Clone, Debug)]
pub struct CompileRequest {
    pub compiler_id: String,
    pub source: String,
    pub user_arguments: String,
}
