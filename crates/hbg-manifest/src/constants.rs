//! Repository names used in generated documents and manifests

/// File name of the action manifest, at both the source and target root
pub const HCM_ACTIONS_NAME: &str = "hcm-actions.yaml";

/// Root key of the action manifest
pub const ACTION_LISTS_KEY: &str = "action-lists";

/// Parent of all updater nodes; the content root and updater name are appended
pub const UPDATE_PATH_PREFIX: &str = "/hippo:configuration/hippo:update/hippo:";

pub const JCR_PRIMARY_TYPE: &str = "jcr:primaryType";
pub const HIPPOSYS_UPDATERINFO: &str = "hipposys:updaterinfo";

pub const HIPPOSYS_BATCHSIZE: &str = "hipposys:batchsize";
pub const HIPPOSYS_DESCRIPTION: &str = "hipposys:description";
pub const HIPPOSYS_DRYRUN: &str = "hipposys:dryrun";
pub const HIPPOSYS_PARAMETERS: &str = "hipposys:parameters";
pub const HIPPOSYS_PATH: &str = "hipposys:path";
pub const HIPPOSYS_QUERY: &str = "hipposys:query";
pub const HIPPOSYS_SCRIPT: &str = "hipposys:script";
pub const HIPPOSYS_THROTTLE: &str = "hipposys:throttle";
