//! Shared fakes for sequencer integration tests

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;
use tilawa_core::{Playlist, ProgramId, Segment, SegmentKey, TextRef};
use tilawa_playback::{
    ObserverResult, PlayableResource, PlaybackError, PlaybackTicket, Progress, SyncObserver,
};

// ===== Fake Resource =====

/// Everything the sequencer asked the fake resource to do
#[derive(Debug, Default)]
pub struct ResourceLog {
    pub starts: Vec<(PlaybackTicket, String, f64)>,
    pub pauses: usize,
    pub resumes: usize,
    pub detaches: usize,
    pub unplayable: HashSet<String>,
}

impl ResourceLog {
    pub fn last_ticket(&self) -> PlaybackTicket {
        self.starts.last().map(|(t, _, _)| *t).expect("nothing started")
    }

    pub fn sources(&self) -> Vec<&str> {
        self.starts.iter().map(|(_, s, _)| s.as_str()).collect()
    }
}

/// Resource that records calls and never produces audio
pub struct FakeResource {
    log: Rc<RefCell<ResourceLog>>,
}

impl FakeResource {
    pub fn new() -> (Self, Rc<RefCell<ResourceLog>>) {
        let log = Rc::new(RefCell::new(ResourceLog::default()));
        (Self { log: log.clone() }, log)
    }
}

impl PlayableResource for FakeResource {
    fn start(
        &mut self,
        ticket: PlaybackTicket,
        source: &str,
        offset: f64,
    ) -> tilawa_playback::Result<()> {
        let mut log = self.log.borrow_mut();
        if log.unplayable.contains(source) {
            return Err(PlaybackError::SegmentUnplayable {
                key: source.to_string(),
                reason: "NotSupportedError".to_string(),
            });
        }
        log.starts.push((ticket, source.to_string(), offset));
        Ok(())
    }

    fn pause(&mut self) {
        self.log.borrow_mut().pauses += 1;
    }

    fn resume(&mut self) -> tilawa_playback::Result<()> {
        self.log.borrow_mut().resumes += 1;
        Ok(())
    }

    fn detach(&mut self) {
        self.log.borrow_mut().detaches += 1;
    }
}

// ===== Fake Observer =====

/// UI calls in the order they were made
#[derive(Debug, Clone, PartialEq)]
pub enum UiCall {
    Highlight(usize, String),
    Cleared,
    Progress(Progress),
}

/// Observer that records every call
pub struct FakeObserver {
    calls: Rc<RefCell<Vec<UiCall>>>,
}

impl FakeObserver {
    pub fn new() -> (Self, Rc<RefCell<Vec<UiCall>>>) {
        let calls = Rc::new(RefCell::new(Vec::new()));
        (
            Self {
                calls: calls.clone(),
            },
            calls,
        )
    }
}

impl SyncObserver for FakeObserver {
    fn on_highlight(&mut self, index: usize, text_ref: &TextRef) -> ObserverResult {
        self.calls
            .borrow_mut()
            .push(UiCall::Highlight(index, text_ref.to_string()));
        Ok(())
    }

    fn on_highlight_cleared(&mut self) -> ObserverResult {
        self.calls.borrow_mut().push(UiCall::Cleared);
        Ok(())
    }

    fn on_progress(&mut self, progress: Progress) -> ObserverResult {
        self.calls.borrow_mut().push(UiCall::Progress(progress));
        Ok(())
    }
}

/// Indices highlighted, in order
pub fn highlights(calls: &[UiCall]) -> Vec<usize> {
    calls
        .iter()
        .filter_map(|c| match c {
            UiCall::Highlight(i, _) => Some(*i),
            _ => None,
        })
        .collect()
}

// ===== Playlists =====

/// Surah playlist; `None` durations mark verses without audio
pub fn surah(number: u16, durations: &[Option<f64>]) -> Playlist {
    let segments = durations
        .iter()
        .enumerate()
        .map(|(i, d)| {
            let verse = i as u16 + 1;
            Segment::new(
                SegmentKey::verse(number, verse),
                d.map(|_| format!("https://verses.quran.com/{number}/{verse}.mp3")),
                d.unwrap_or(0.0),
                TextRef::new(format!("verse-{verse}")),
            )
        })
        .collect();
    Playlist::new(ProgramId::surah(number), segments)
}
