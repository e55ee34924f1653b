//! Default values and polarity tables for translated fields.
//!
//! This module centralizes the per-field default policy so it can be unit
//! tested independently of tree traversal. Two defaults exist per boolean
//! field: what the Jenkins server assumes when the element is absent, and
//! what the target JJB schema assumes when the key is absent. A value is
//! emitted only when it differs from the JJB default; where the two
//! defaults disagree (a polarity flip), an absent source element therefore
//! still produces an explicit entry.

/// Default policy for one boolean field.
#[derive(Debug, Clone, Copy)]
pub struct BoolField {
    /// The key emitted in the output document.
    pub key: &'static str,
    /// What Jenkins assumes when the source element is absent.
    pub jenkins_default: bool,
    /// What JJB assumes when the output key is absent.
    pub jjb_default: bool,
}

/// Top-level boolean job settings. All default to `false` on both sides,
/// so only a `true` value is ever emitted.
pub const JOB_BOOL_FIELDS: &[BoolField] = &[
    BoolField {
        key: "disabled",
        jenkins_default: false,
        jjb_default: false,
    },
    BoolField {
        key: "block-downstream",
        jenkins_default: false,
        jjb_default: false,
    },
    BoolField {
        key: "block-upstream",
        jenkins_default: false,
        jjb_default: false,
    },
    BoolField {
        key: "concurrent",
        jenkins_default: false,
        jjb_default: false,
    },
];

/// Boolean options of the git SCM record.
///
/// `wipe-workspace` and `skip-tag` are deliberate polarity flips: Jenkins
/// defaults them to `false` while the JJB schema documents `true`. The two
/// constants are kept separate per field rather than unified; the
/// discrepancy is a compensating default in the target schema, not an
/// accident.
pub const GIT_BOOL_FIELDS: &[BoolField] = &[
    BoolField {
        key: "use-author",
        jenkins_default: false,
        jjb_default: false,
    },
    BoolField {
        key: "shallow-clone",
        jenkins_default: false,
        jjb_default: false,
    },
    BoolField {
        key: "ignore-notify",
        jenkins_default: false,
        jjb_default: false,
    },
    BoolField {
        key: "prune",
        jenkins_default: false,
        jjb_default: false,
    },
    BoolField {
        key: "fastpoll",
        jenkins_default: false,
        jjb_default: false,
    },
    BoolField {
        key: "wipe-workspace",
        jenkins_default: false,
        jjb_default: true,
    },
    BoolField {
        key: "skip-tag",
        jenkins_default: false,
        jjb_default: true,
    },
];

/// Blocking thresholds of the parameterized trigger builder and the value
/// each takes when its element is absent.
pub const BLOCK_THRESHOLD_DEFAULTS: &[(&str, &str)] = &[
    ("build-step-failure-threshold", "never"),
    ("unstable-threshold", "never"),
    ("failure-threshold", "never"),
];

/// Look up a field's policy by output key.
pub fn lookup(table: &'static [BoolField], key: &str) -> Option<&'static BoolField> {
    table.iter().find(|field| field.key == key)
}

/// Apply the suppression rule: the value actually in effect (the source's,
/// or the Jenkins default when the element is absent) is emitted only when
/// it differs from the JJB default.
pub fn emit_bool(field: &BoolField, value: Option<bool>) -> Option<bool> {
    let effective = value.unwrap_or(field.jenkins_default);
    (effective != field.jjb_default).then_some(effective)
}
