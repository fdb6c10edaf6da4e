use metrics_exporter_prometheus::PrometheusHandle;
use placement::allocation::Preference;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Parses a `--choice` value: `ICU` for a regular slot, `ICU:bound` for a bound one.
pub(crate) fn parse_choice(raw: &str) -> Result<Preference, String> {
    let raw = raw.trim();
    let (label, kind) = match raw.rsplit_once(':') {
        Some((label, kind)) => (label.trim(), Some(kind.trim())),
        None => (raw, None),
    };

    if label.is_empty() {
        return Err(format!("'{raw}' is missing a department label"));
    }

    match kind.map(str::to_ascii_lowercase).as_deref() {
        None | Some("regular") | Some("r") => Ok(Preference::regular(label)),
        Some("bound") | Some("b") => Ok(Preference::bound(label)),
        Some(other) => Err(format!(
            "unknown slot kind '{other}' in '{raw}' (expected 'regular' or 'bound')"
        )),
    }
}
