use crate::error::SectionError;
use crate::explorer::{ConditionalExplorer, ExplorerDefaults};
use crate::report::{ReportDocument, CONDITIONAL_ENTRY_TAG};
use crate::sections::{RenderOutcome, SectionRenderer, MOUNT_ABSENT, NO_DATA};
use crate::view::{MountId, MountSet};

const MOUNTS: [MountId; 2] = [MountId::EntryTagSummary, MountId::ConditionalEntryGrid];

/// Initial render of the explorer with its default controls. Hosts keep their
/// own [`ConditionalExplorer`] to re-render on control changes.
pub struct ConditionalEntryTagSection {
    defaults: ExplorerDefaults,
}

impl ConditionalEntryTagSection {
    pub fn new(defaults: ExplorerDefaults) -> Self {
        Self { defaults }
    }
}

impl SectionRenderer for ConditionalEntryTagSection {
    fn key(&self) -> &'static str {
        CONDITIONAL_ENTRY_TAG
    }

    fn mounts(&self) -> &'static [MountId] {
        &MOUNTS
    }

    fn render(&self, doc: &ReportDocument, mounts: &mut MountSet) -> Result<RenderOutcome, SectionError> {
        if !mounts.contains_all(&MOUNTS) {
            return Ok(RenderOutcome::Skipped(MOUNT_ABSENT));
        }
        match ConditionalExplorer::new(doc, &self.defaults) {
            Some(explorer) => explorer.render(doc, mounts),
            None => Ok(RenderOutcome::Skipped(NO_DATA)),
        }
    }
}
