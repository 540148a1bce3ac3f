//! Resolution outcome for a click on a short code.

/// The result of resolving a short code at a given instant.
///
/// All four variants are expected business outcomes, not errors. Only
/// `Success` increments the click counter; the failure variants are
/// produced without any write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveOutcome {
    /// The link was valid; the click was counted and the destination returned.
    Success { original_url: String },
    /// No row exists for this code.
    NotFound,
    /// The link exists but its expiry time has passed.
    Expired,
    /// The link is one-time and has already been used.
    Consumed,
}

impl ResolveOutcome {
    /// Short machine-readable label, used in structured log events.
    pub fn reason(&self) -> &'static str {
        match self {
            ResolveOutcome::Success { .. } => "ok",
            ResolveOutcome::NotFound => "not_found",
            ResolveOutcome::Expired => "expired",
            ResolveOutcome::Consumed => "consumed",
        }
    }
}
