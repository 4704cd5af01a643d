use serde::{Deserialize, Serialize};

#[derive(Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(super) struct ListRecordsQuery {
    #[serde(default)]
    pub hide_managed: bool,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct MutationResult {
    pub ok: bool,
}

impl MutationResult {
    pub const OK: MutationResult = MutationResult { ok: true };
}
