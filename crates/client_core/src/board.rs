//! Notes grid state: loading, title search, the starred view and optimistic
//! star toggles.

use std::collections::HashMap;

use shared::domain::{Note, NoteId};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LoadState {
    #[default]
    Loading,
    Ready,
    Failed(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NotesView {
    #[default]
    All,
    Starred,
}

#[derive(Debug, Default)]
pub struct NotesBoard {
    view: NotesView,
    state: LoadState,
    notes: Vec<Note>,
    search: String,
    /// In-flight star toggles, keyed by note, holding the flag to restore on failure.
    pending_stars: HashMap<NoteId, bool>,
}

impl NotesBoard {
    pub fn new(view: NotesView) -> Self {
        Self {
            view,
            ..Self::default()
        }
    }

    pub fn view(&self) -> NotesView {
        self.view
    }

    /// Switching views clears the search, like navigating between pages.
    pub fn set_view(&mut self, view: NotesView) {
        if self.view != view {
            self.view = view;
            self.search.clear();
        }
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state == LoadState::Loading
    }

    pub fn begin_loading(&mut self) {
        self.state = LoadState::Loading;
    }

    pub fn loaded(&mut self, notes: Vec<Note>) {
        self.notes = notes;
        self.pending_stars.clear();
        self.state = LoadState::Ready;
    }

    pub fn load_failed(&mut self, message: impl Into<String>) {
        self.state = LoadState::Failed(message.into());
    }

    pub fn clear(&mut self) {
        self.notes.clear();
        self.pending_stars.clear();
        self.search.clear();
        self.state = LoadState::Loading;
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn get(&self, id: NoteId) -> Option<&Note> {
        self.notes.iter().find(|note| note.id == id)
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
    }

    pub fn search_mut(&mut self) -> &mut String {
        &mut self.search
    }

    /// Notes in the current view whose title contains the search text, ignoring case.
    pub fn visible(&self) -> Vec<&Note> {
        let needle = self.search.to_lowercase();
        self.notes
            .iter()
            .filter(|note| self.view == NotesView::All || note.starred)
            .filter(|note| note.title.to_lowercase().contains(&needle))
            .collect()
    }

    pub fn empty_message(&self) -> &'static str {
        match (self.view, self.search.is_empty()) {
            (NotesView::All, true) => "No notes yet. Create your first note!",
            (NotesView::All, false) => "No notes match your search.",
            (NotesView::Starred, true) => "No starred notes yet. Star your favorite notes!",
            (NotesView::Starred, false) => "No starred notes match your search.",
        }
    }

    pub fn upsert(&mut self, note: Note) {
        match self.notes.iter_mut().find(|existing| existing.id == note.id) {
            Some(existing) => *existing = note,
            None => self.notes.push(note),
        }
    }

    pub fn remove(&mut self, id: NoteId) -> Option<Note> {
        self.pending_stars.remove(&id);
        let index = self.notes.iter().position(|note| note.id == id)?;
        Some(self.notes.remove(index))
    }

    pub fn is_toggling(&self, id: NoteId) -> bool {
        self.pending_stars.contains_key(&id)
    }

    /// Flips the starred flag locally before the server answers.
    ///
    /// Returns the new flag, or `None` when the note is unknown or already has a
    /// toggle in flight.
    pub fn begin_star_toggle(&mut self, id: NoteId) -> Option<bool> {
        if self.pending_stars.contains_key(&id) {
            return None;
        }
        let note = self.notes.iter_mut().find(|note| note.id == id)?;
        self.pending_stars.insert(id, note.starred);
        note.starred = !note.starred;
        Some(note.starred)
    }

    /// Accepts the server's copy of a toggled note.
    pub fn complete_star_toggle(&mut self, note: Note) {
        self.pending_stars.remove(&note.id);
        self.upsert(note);
    }

    /// Restores the flag a failed toggle started from.
    pub fn fail_star_toggle(&mut self, id: NoteId) {
        let Some(previous) = self.pending_stars.remove(&id) else {
            return;
        };
        if let Some(note) = self.notes.iter_mut().find(|note| note.id == id) {
            note.starred = previous;
        }
    }
}

#[cfg(test)]
#[path = "tests/board_tests.rs"]
mod tests;
