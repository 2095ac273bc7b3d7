use serde_json::Value;
use sha2::{Digest, Sha256};
use std::sync::OnceLock;

pub const CONTRACT_ID: &str = "pageaudit.report_contract";
pub const CONTRACT_VERSION: &str = "1";

const CHECK_REGISTRY_ID: &str = "pageaudit.check_registry.v1";

pub const OVERFLOW_TOLERANCE_PX: f64 = 1.0;
pub const OVERFLOW_CULPRIT_CAP: usize = 20;

pub const CONTRAST_FAILURE_CAP: usize = 25;
pub const CONTRAST_TEXT_CHARS: usize = 40;
pub const WCAG_AA_NORMAL: f64 = 4.5;
pub const WCAG_AA_LARGE: f64 = 3.0;
pub const WCAG_AAA_NORMAL: f64 = 7.0;
pub const WCAG_AAA_LARGE: f64 = 4.5;
pub const LARGE_TEXT_PX: f64 = 24.0;
pub const LARGE_BOLD_TEXT_PX: f64 = 18.66;
pub const BOLD_WEIGHT: i64 = 700;

pub const INTERACTIVE_ENTRY_CAP: usize = 25;
pub const INTERACTIVE_LABEL_CHARS: usize = 30;

pub const TOKEN_EMPTY_PLACEHOLDER: &str = "(empty)";

pub const HARDCODED_ENTRY_CAP: usize = 20;
pub const HARDCODED_SELECTOR_CHARS: usize = 80;
pub const HARDCODED_SNIPPET_CHARS: usize = 150;
pub const HARDCODED_COLORS_PER_ENTRY: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckDef {
    pub key: &'static str,
    pub name: &'static str,
}

/// A bounded finding list inside one check's output. Paths are dot-separated
/// object keys relative to the check object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListCapDef {
    pub check: &'static str,
    pub list: &'static str,
    pub total: Option<&'static str>,
    pub cap: usize,
}

pub const CHECKS_V1: [CheckDef; 5] = [
    CheckDef {
        key: "overflow",
        name: "Overflow Detector",
    },
    CheckDef {
        key: "contrast",
        name: "Contrast Analyzer",
    },
    CheckDef {
        key: "interactiveStates",
        name: "Interactive-State Auditor",
    },
    CheckDef {
        key: "tokens",
        name: "Token Propagation Checker",
    },
    CheckDef {
        key: "hardcodedColors",
        name: "Hardcoded-Color Detector",
    },
];

pub const LIST_CAPS_V1: [ListCapDef; 5] = [
    ListCapDef {
        check: "overflow",
        list: "culprits",
        total: None,
        cap: OVERFLOW_CULPRIT_CAP,
    },
    ListCapDef {
        check: "contrast",
        list: "failures",
        total: Some("totalFailures"),
        cap: CONTRAST_FAILURE_CAP,
    },
    ListCapDef {
        check: "interactiveStates",
        list: "entries",
        total: Some("issueCount"),
        cap: INTERACTIVE_ENTRY_CAP,
    },
    ListCapDef {
        check: "hardcodedColors",
        list: "stylesheet.entries",
        total: Some("stylesheet.total"),
        cap: HARDCODED_ENTRY_CAP,
    },
    ListCapDef {
        check: "hardcodedColors",
        list: "inline.entries",
        total: Some("inline.total"),
        cap: HARDCODED_ENTRY_CAP,
    },
];

// Compiled into the binary; runtime never reads the registry from disk.
const CHECK_REGISTRY_V1_JSON: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/registry/check_registry.v1.json"
));

#[derive(Debug, Clone)]
pub struct ReportContractMetadata {
    pub contract_id: &'static str,
    pub contract_version: &'static str,
    pub contract_fingerprint_sha256: String,
    pub check_registry_id: &'static str,
    pub check_registry_hash_sha256: String,
}

fn hex_sha256(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex_digest(hasher)
}

fn hex_digest(hasher: Sha256) -> String {
    let digest = hasher.finalize();
    let mut out = String::with_capacity(digest.len() * 2);
    for b in digest {
        use std::fmt::Write;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

static CHECK_REGISTRY_HASH: OnceLock<String> = OnceLock::new();
static CONTRACT_FINGERPRINT: OnceLock<String> = OnceLock::new();

pub fn check_registry_v1_json() -> &'static str {
    CHECK_REGISTRY_V1_JSON
}

pub fn check_registry_v1_hash_sha256() -> String {
    CHECK_REGISTRY_HASH
        .get_or_init(|| hex_sha256(CHECK_REGISTRY_V1_JSON.as_bytes()))
        .clone()
}

pub fn contract_fingerprint_sha256() -> String {
    CONTRACT_FINGERPRINT
        .get_or_init(|| {
            let mut hasher = Sha256::new();
            hasher.update(CONTRACT_ID.as_bytes());
            hasher.update(b"\n");
            hasher.update(CONTRACT_VERSION.as_bytes());
            hasher.update(b"\n");
            hasher.update(CHECK_REGISTRY_ID.as_bytes());
            hasher.update(b"\n");
            hasher.update(check_registry_v1_hash_sha256().as_bytes());
            hex_digest(hasher)
        })
        .clone()
}

pub fn check_defs_v1() -> &'static [CheckDef] {
    &CHECKS_V1
}

pub fn list_cap_defs_v1() -> &'static [ListCapDef] {
    &LIST_CAPS_V1
}

pub fn check_def(key: &str) -> Option<&'static CheckDef> {
    CHECKS_V1.iter().find(|d| d.key == key)
}

pub fn metadata() -> ReportContractMetadata {
    ReportContractMetadata {
        contract_id: CONTRACT_ID,
        contract_version: CONTRACT_VERSION,
        contract_fingerprint_sha256: contract_fingerprint_sha256(),
        check_registry_id: CHECK_REGISTRY_ID,
        check_registry_hash_sha256: check_registry_v1_hash_sha256(),
    }
}

fn lookup_path<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(root, |node, key| node.get(key))
}

/// Validates a serialized report against the contract and returns every
/// violation found. An empty result means the report conforms.
pub fn report_shape_issues(report: &Value) -> Vec<String> {
    let mut issues = Vec::new();
    let Some(object) = report.as_object() else {
        issues.push("report is not a JSON object".to_string());
        return issues;
    };

    for key in object.keys() {
        if check_def(key).is_none() {
            issues.push(format!("unexpected top-level key {key:?}"));
        }
    }
    for def in check_defs_v1() {
        if !object.get(def.key).is_some_and(Value::is_object) {
            issues.push(format!("missing check object {:?}", def.key));
        }
    }

    for cap in list_cap_defs_v1() {
        let Some(check) = object.get(cap.check) else {
            continue;
        };
        let Some(list) = lookup_path(check, cap.list).and_then(Value::as_array) else {
            issues.push(format!("{}.{} is not an array", cap.check, cap.list));
            continue;
        };
        if list.len() > cap.cap {
            issues.push(format!(
                "{}.{} has {} entries (cap {})",
                cap.check,
                cap.list,
                list.len(),
                cap.cap
            ));
        }
        if let Some(total_path) = cap.total {
            match lookup_path(check, total_path).and_then(Value::as_u64) {
                Some(total) if (total as usize) < list.len() => issues.push(format!(
                    "{}.{} total {} is below list length {}",
                    cap.check,
                    total_path,
                    total,
                    list.len()
                )),
                Some(_) => {}
                None => issues.push(format!(
                    "{}.{} is not a non-negative integer",
                    cap.check, total_path
                )),
            }
        }
    }

    issues
}
