use smartdoc_core::{
    ChatResponse, FileStore, PendingChat, PendingEmergency, PendingHealth, Session, TransportError,
};
use tokio::task::{JoinError, JoinHandle};

use crate::device::TerminalFeedback;

pub type AppSession = Session<FileStore, TerminalFeedback>;

/// A round trip running on the runtime, waiting to be applied back.
pub enum Task {
    Chat(JoinHandle<Result<ChatResponse, TransportError>>),
    Emergency(JoinHandle<Result<ChatResponse, TransportError>>),
    Health(JoinHandle<Result<(), TransportError>>),
}

impl Task {
    fn is_finished(&self) -> bool {
        match self {
            Task::Chat(handle) | Task::Emergency(handle) => handle.is_finished(),
            Task::Health(handle) => handle.is_finished(),
        }
    }
}

fn flatten<T>(joined: Result<Result<T, TransportError>, JoinError>) -> Result<T, TransportError> {
    joined.unwrap_or_else(|e| Err(TransportError::Network(e.to_string())))
}

pub struct App {
    pub should_quit: bool,
    pub session: AppSession,
    pub tasks: Vec<Task>,

    // Transcript scrolling
    pub chat_scroll: u16,
    pub chat_height: u16,
    pub chat_width: u16,
    pub follow_tail: bool,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation
}

impl App {
    pub fn new(session: AppSession) -> Self {
        Self {
            should_quit: false,
            session,
            tasks: Vec::new(),
            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,
            follow_tail: true,
            animation_frame: 0,
        }
    }

    pub fn spawn_chat(&mut self, pending: PendingChat) {
        self.follow_tail = true;
        self.tasks.push(Task::Chat(tokio::spawn(pending.run())));
    }

    pub fn spawn_emergency(&mut self, pending: PendingEmergency) {
        self.follow_tail = true;
        self.tasks.push(Task::Emergency(tokio::spawn(pending.run())));
    }

    pub fn spawn_health(&mut self, pending: PendingHealth) {
        self.tasks.push(Task::Health(tokio::spawn(pending.run())));
    }

    /// Apply every finished round trip to the session.
    pub async fn poll_tasks(&mut self) {
        let mut running = Vec::with_capacity(self.tasks.len());

        for task in std::mem::take(&mut self.tasks) {
            if !task.is_finished() {
                running.push(task);
                continue;
            }

            match task {
                Task::Chat(handle) => self.session.finish_chat(flatten(handle.await)),
                Task::Emergency(handle) => self.session.finish_emergency(flatten(handle.await)),
                Task::Health(handle) => self.session.finish_health(flatten(handle.await)),
            }
            self.follow_tail = true;
        }

        self.tasks = running;
    }

    /// Tick animation frame and collect finished requests (called by Tick event)
    pub async fn tick(&mut self) {
        if self.session.transcript().is_loading() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
        self.poll_tasks().await;
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.follow_tail = false;
        self.chat_scroll = self.chat_scroll.saturating_sub(lines);
    }

    /// Scrolling down past the end re-attaches to the newest message.
    pub fn scroll_down(&mut self, lines: u16, max_scroll: u16) {
        self.chat_scroll = self.chat_scroll.saturating_add(lines).min(max_scroll);
        if self.chat_scroll >= max_scroll {
            self.follow_tail = true;
        }
    }

    pub fn page(&self) -> u16 {
        self.chat_height.saturating_sub(1).max(1)
    }
}
