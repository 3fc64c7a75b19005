//! Ordered registry of track factories.

use keytone_core::AudioContext;

use super::{TrackHandle, TrackKind};
use crate::error::Result;
use crate::scheduler::Scheduler;

/// Builds one track on a context.
pub type TrackFactory =
    Box<dyn Fn(&mut AudioContext, &mut Scheduler) -> Result<TrackHandle> + Send + Sync>;

struct Entry {
    name: String,
    factory: TrackFactory,
}

/// Fixed, enumerable set of tracks to pick from.
///
/// [`TrackLibrary::standard`] holds the five built-in tracks. Custom
/// libraries are useful for restricting a deployment to a subset, or for
/// tests that need factories with known behavior.
#[derive(Default)]
pub struct TrackLibrary {
    entries: Vec<Entry>,
}

impl core::fmt::Debug for TrackLibrary {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list().entries(self.entries.iter().map(|e| &e.name)).finish()
    }
}

impl TrackLibrary {
    /// An empty library.
    pub fn new() -> Self {
        Self::default()
    }

    /// The five built-in tracks in [`TrackKind::ALL`] order.
    pub fn standard() -> Self {
        Self::from_kinds(&TrackKind::ALL)
    }

    /// A library holding only the given built-in tracks.
    pub fn from_kinds(kinds: &[TrackKind]) -> Self {
        let mut library = Self::new();
        for &kind in kinds {
            library.push(kind.name(), Box::new(move |ctx, scheduler| kind.create(ctx, scheduler)));
        }
        library
    }

    /// Append a named factory.
    pub fn push(&mut self, name: impl Into<String>, factory: TrackFactory) {
        self.entries.push(Entry {
            name: name.into(),
            factory,
        });
    }

    /// Builder form of [`push`](Self::push).
    pub fn with(mut self, name: impl Into<String>, factory: TrackFactory) -> Self {
        self.push(name, factory);
        self
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the library has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    /// Name of entry `index`.
    pub fn name(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(|e| e.name.as_str())
    }

    /// Run the factory at `index`. Returns `None` if out of range.
    pub fn create(
        &self,
        index: usize,
        ctx: &mut AudioContext,
        scheduler: &mut Scheduler,
    ) -> Option<Result<TrackHandle>> {
        self.entries
            .get(index)
            .map(|entry| (entry.factory)(ctx, scheduler))
    }
}
