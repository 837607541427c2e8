//! Scripted key input replayed by the headless explorer.

use anyhow::{bail, Context, Result};
use tropical_trouble_system_input::KeyEvent;

/// One key notification scheduled for a specific host frame.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct ScriptedKey {
    pub(crate) frame: u32,
    pub(crate) event: KeyEvent,
}

/// Parses a comma separated script such as `ArrowLeft@0,Space@40,-Space@41`.
///
/// A leading `-` marks a release; everything else is a press. Entries are
/// returned sorted by frame, keeping the written order within a frame.
pub(crate) fn parse(script: &str) -> Result<Vec<ScriptedKey>> {
    let mut keys = Vec::new();
    for entry in script.split(',').map(str::trim).filter(|entry| !entry.is_empty()) {
        let (key, frame) = entry
            .rsplit_once('@')
            .with_context(|| format!("script entry `{entry}` is missing `@frame`"))?;
        let frame: u32 = frame
            .parse()
            .with_context(|| format!("script entry `{entry}` has an invalid frame"))?;
        let event = match key.strip_prefix('-') {
            Some(released) => KeyEvent::released(released),
            None => KeyEvent::pressed(key),
        };
        if event.key.is_empty() {
            bail!("script entry `{entry}` names no key");
        }
        keys.push(ScriptedKey { frame, event });
    }
    keys.sort_by_key(|scripted| scripted.frame);
    Ok(keys)
}

/// Keys scheduled for `frame`.
pub(crate) fn due(script: &[ScriptedKey], frame: u32) -> impl Iterator<Item = &KeyEvent> {
    script
        .iter()
        .filter(move |scripted| scripted.frame == frame)
        .map(|scripted| &scripted.event)
}
