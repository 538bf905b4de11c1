use ratatui::widgets::TableState;

use crate::chat::{BotReply, ChatMessage};
use crate::coordinator::LoadingFlag;
use crate::notify::{NoticeBoard, Severity};
use crate::panel::{
    cycle_value, distinct_values, Business, DirectoryPayload, ListingFilter, MapPin,
    PendingDocument, UserRow,
};

/// The dashboard panels, in tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelKind {
    Users,
    Documents,
    Businesses,
    Map,
    Chat,
}

impl PanelKind {
    pub const ALL: [PanelKind; 5] = [
        PanelKind::Users,
        PanelKind::Documents,
        PanelKind::Businesses,
        PanelKind::Map,
        PanelKind::Chat,
    ];

    pub fn title(self) -> &'static str {
        match self {
            PanelKind::Users => "Users",
            PanelKind::Documents => "Documents",
            PanelKind::Businesses => "Businesses",
            PanelKind::Map => "Map",
            PanelKind::Chat => "Chat",
        }
    }

    /// Coordinator feed keys backing this panel. The map panel is fed by two
    /// endpoints; chat is not polled at all.
    pub fn feed_keys(self) -> &'static [&'static str] {
        match self {
            PanelKind::Users => &["users"],
            PanelKind::Documents => &["documents"],
            PanelKind::Businesses => &["businesses"],
            PanelKind::Map => &["jobs", "services"],
            PanelKind::Chat => &[],
        }
    }

    pub fn next(self) -> Self {
        let i = Self::ALL.iter().position(|p| *p == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }

    pub fn previous(self) -> Self {
        let i = Self::ALL.iter().position(|p| *p == self).unwrap_or(0);
        Self::ALL[(i + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Typed messages drained by the main loop: feed callbacks and the chat task
/// send these instead of touching UI state directly.
#[derive(Debug)]
pub enum AppMsg {
    Users(Vec<UserRow>),
    Documents(Vec<PendingDocument>),
    Businesses(DirectoryPayload),
    Jobs(Vec<MapPin>),
    Services(Vec<MapPin>),
    FeedFailed { key: String, detail: String },
    ChatReply(BotReply),
    ChatFailed(String),
}

/// Loading flags shared with the coordinator, one per feed.
#[derive(Clone, Default)]
pub struct PanelFlags {
    pub users: LoadingFlag,
    pub documents: LoadingFlag,
    pub businesses: LoadingFlag,
    pub jobs: LoadingFlag,
    pub services: LoadingFlag,
}

impl PanelFlags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether any feed behind `panel` is currently refreshing.
    pub fn is_loading(&self, panel: PanelKind) -> bool {
        match panel {
            PanelKind::Users => self.users.is_loading(),
            PanelKind::Documents => self.documents.is_loading(),
            PanelKind::Businesses => self.businesses.is_loading(),
            PanelKind::Map => self.jobs.is_loading() || self.services.is_loading(),
            PanelKind::Chat => false,
        }
    }
}

/// Whether plain keystrokes navigate or edit the directory filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    FilterEdit,
}

pub struct App {
    pub panel: PanelKind,
    pub mode: InputMode,

    pub users: Vec<UserRow>,
    pub users_state: TableState,
    pub documents: Vec<PendingDocument>,
    pub documents_state: TableState,
    pub businesses: Vec<Business>,
    /// Directory matches across all pages, not just the fetched page.
    pub businesses_total: u64,
    pub businesses_state: TableState,
    pub filter: ListingFilter,
    pub jobs: Vec<MapPin>,
    pub services: Vec<MapPin>,
    pub pins_state: TableState,

    pub chat: Vec<ChatMessage>,
    pub chat_input: String,
    pub chat_pending: bool,
    pub chat_suggestions: Vec<String>,

    pub notices: NoticeBoard,
    pub flags: PanelFlags,
    /// Last poll/update status shown in the status bar.
    pub status: String,
    /// Mirrors the coordinator so the status bar can show paused state.
    pub polling: bool,
    pub quit: bool,
}

impl App {
    pub fn new(flags: PanelFlags) -> Self {
        Self {
            panel: PanelKind::Users,
            mode: InputMode::Normal,
            users: Vec::new(),
            users_state: TableState::default(),
            documents: Vec::new(),
            documents_state: TableState::default(),
            businesses: Vec::new(),
            businesses_total: 0,
            businesses_state: TableState::default(),
            filter: ListingFilter::default(),
            jobs: Vec::new(),
            services: Vec::new(),
            pins_state: TableState::default(),
            chat: Vec::new(),
            chat_input: String::new(),
            chat_pending: false,
            chat_suggestions: Vec::new(),
            notices: NoticeBoard::new(),
            flags,
            status: "Starting…".into(),
            polling: true,
            quit: false,
        }
    }

    /// Apply one message from the channel.
    pub fn apply(&mut self, msg: AppMsg) {
        match msg {
            AppMsg::Users(rows) => {
                self.status = format!("Users updated ({} rows)", rows.len());
                self.users = rows;
                clamp_selection(&mut self.users_state, self.users.len());
            }
            AppMsg::Documents(rows) => {
                self.status = format!("Pending documents updated ({} rows)", rows.len());
                self.documents = rows;
                clamp_selection(&mut self.documents_state, self.documents.len());
            }
            AppMsg::Businesses(page) => {
                self.status = if page.total > 0 {
                    format!("Businesses updated ({} of {})", page.businesses.len(), page.total)
                } else {
                    format!("Businesses updated ({} rows)", page.businesses.len())
                };
                self.businesses = page.businesses;
                self.businesses_total = page.total;
                let visible = self.visible_businesses().len();
                clamp_selection(&mut self.businesses_state, visible);
            }
            AppMsg::Jobs(pins) => {
                self.status = format!("Job map updated ({} pins)", pins.len());
                self.jobs = pins;
                let visible = self.visible_pins().len();
                clamp_selection(&mut self.pins_state, visible);
            }
            AppMsg::Services(pins) => {
                self.status = format!("Service map updated ({} pins)", pins.len());
                self.services = pins;
                let visible = self.visible_pins().len();
                clamp_selection(&mut self.pins_state, visible);
            }
            AppMsg::FeedFailed { key, detail } => {
                self.status = format!("Update failed: {key}");
                self.notices.push("Update failed", format!("{key}: {detail}"), Severity::Danger);
            }
            AppMsg::ChatReply(reply) => {
                self.chat_pending = false;
                self.chat_suggestions = reply.suggestions;
                self.chat.push(if reply.is_error {
                    ChatMessage::bot_error(reply.text)
                } else {
                    ChatMessage::bot(reply.text)
                });
            }
            AppMsg::ChatFailed(detail) => {
                self.chat_pending = false;
                self.chat
                    .push(ChatMessage::bot_error("Sorry, there was an error processing your request."));
                self.status = format!("Chat request failed: {detail}");
            }
        }
    }

    /// Record the user's side of a chat exchange; the network half runs
    /// elsewhere and answers through [`AppMsg::ChatReply`].
    pub fn begin_chat_exchange(&mut self, text: &str) {
        self.chat.push(ChatMessage::user(text));
        self.chat_suggestions.clear();
        self.chat_pending = true;
    }

    // -- derived views -------------------------------------------------------

    pub fn visible_businesses(&self) -> Vec<&Business> {
        self.filter.apply(&self.businesses)
    }

    /// Placed pins, jobs first, each tagged with its kind.
    pub fn visible_pins(&self) -> Vec<(&'static str, &MapPin)> {
        self.jobs
            .iter()
            .map(|p| ("job", p))
            .chain(self.services.iter().map(|p| ("service", p)))
            .filter(|(_, p)| p.has_coordinates())
            .collect()
    }

    pub fn cycle_category(&mut self) {
        let categories = distinct_values(&self.businesses, |b| b.category.as_str());
        self.filter.category = cycle_value(&categories, &self.filter.category);
        let visible = self.visible_businesses().len();
        clamp_selection(&mut self.businesses_state, visible);
    }

    pub fn cycle_location(&mut self) {
        let locations = distinct_values(&self.businesses, |b| b.location.as_str());
        self.filter.location = cycle_value(&locations, &self.filter.location);
        let visible = self.visible_businesses().len();
        clamp_selection(&mut self.businesses_state, visible);
    }

    pub fn select_panel(&mut self, panel: PanelKind) {
        self.panel = panel;
        self.mode = InputMode::Normal;
    }

    // -- navigation ----------------------------------------------------------

    fn current_len(&self) -> usize {
        match self.panel {
            PanelKind::Users => self.users.len(),
            PanelKind::Documents => self.documents.len(),
            PanelKind::Businesses => self.visible_businesses().len(),
            PanelKind::Map => self.visible_pins().len(),
            PanelKind::Chat => 0,
        }
    }

    fn current_state_mut(&mut self) -> Option<&mut TableState> {
        match self.panel {
            PanelKind::Users => Some(&mut self.users_state),
            PanelKind::Documents => Some(&mut self.documents_state),
            PanelKind::Businesses => Some(&mut self.businesses_state),
            PanelKind::Map => Some(&mut self.pins_state),
            PanelKind::Chat => None,
        }
    }

    pub fn select_next(&mut self) {
        let len = self.current_len();
        if len == 0 {
            return;
        }
        if let Some(state) = self.current_state_mut() {
            let i = match state.selected() {
                Some(i) => (i + 1).min(len - 1),
                None => 0,
            };
            state.select(Some(i));
        }
    }

    pub fn select_previous(&mut self) {
        if self.current_len() == 0 {
            return;
        }
        if let Some(state) = self.current_state_mut() {
            let i = match state.selected() {
                Some(i) => i.saturating_sub(1),
                None => 0,
            };
            state.select(Some(i));
        }
    }

    pub fn select_first(&mut self) {
        if self.current_len() == 0 {
            return;
        }
        if let Some(state) = self.current_state_mut() {
            state.select(Some(0));
        }
    }

    pub fn select_last(&mut self) {
        let len = self.current_len();
        if len == 0 {
            return;
        }
        if let Some(state) = self.current_state_mut() {
            state.select(Some(len - 1));
        }
    }
}

/// Keep a table selection valid after its row count changed.
fn clamp_selection(state: &mut TableState, len: usize) {
    match state.selected() {
        Some(_) if len == 0 => state.select(None),
        Some(i) if i >= len => state.select(Some(len - 1)),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> App {
        App::new(PanelFlags::new())
    }

    fn users(n: usize) -> Vec<UserRow> {
        (0..n)
            .map(|i| UserRow {
                first_name: format!("user{i}"),
                ..UserRow::default()
            })
            .collect()
    }

    fn directory(businesses: Vec<Business>) -> AppMsg {
        AppMsg::Businesses(DirectoryPayload {
            total: businesses.len() as u64,
            businesses,
        })
    }

    #[test]
    fn new_app_starts_on_users_panel() {
        let app = app();
        assert_eq!(app.panel, PanelKind::Users);
        assert!(!app.quit);
        assert!(app.users.is_empty());
        assert!(app.users_state.selected().is_none());
    }

    #[test]
    fn panel_order_cycles_and_wraps() {
        assert_eq!(PanelKind::Users.next(), PanelKind::Documents);
        assert_eq!(PanelKind::Chat.next(), PanelKind::Users);
        assert_eq!(PanelKind::Users.previous(), PanelKind::Chat);
    }

    #[test]
    fn map_panel_is_backed_by_both_pin_feeds() {
        assert_eq!(PanelKind::Map.feed_keys(), ["jobs", "services"]);
        assert!(PanelKind::Chat.feed_keys().is_empty());
    }

    #[test]
    fn apply_users_replaces_rows_and_updates_status() {
        let mut app = app();
        app.apply(AppMsg::Users(users(2)));
        assert_eq!(app.users.len(), 2);
        assert!(app.status.contains("2 rows"));
    }

    #[test]
    fn apply_clamps_a_now_invalid_selection() {
        let mut app = app();
        app.apply(AppMsg::Users(users(5)));
        app.users_state.select(Some(4));
        app.apply(AppMsg::Users(users(2)));
        assert_eq!(app.users_state.selected(), Some(1));

        app.apply(AppMsg::Users(Vec::new()));
        assert!(app.users_state.selected().is_none());
    }

    #[test]
    fn feed_failure_raises_a_danger_notice() {
        let mut app = app();
        app.apply(AppMsg::FeedFailed {
            key: "users".into(),
            detail: "server returned 500".into(),
        });
        assert_eq!(app.notices.len(), 1);
        let notice = app.notices.iter().next().unwrap();
        assert_eq!(notice.severity, Severity::Danger);
        assert!(notice.message.contains("users"));
    }

    #[test]
    fn chat_exchange_round_trip() {
        let mut app = app();
        app.begin_chat_exchange("hello");
        assert!(app.chat_pending);
        assert_eq!(app.chat.len(), 1);

        app.apply(AppMsg::ChatReply(BotReply {
            text: "hi there".into(),
            suggestions: vec!["Find jobs".into()],
            is_error: false,
        }));
        assert!(!app.chat_pending);
        assert_eq!(app.chat.len(), 2);
        assert_eq!(app.chat_suggestions, ["Find jobs"]);
    }

    #[test]
    fn chat_failure_adds_an_error_bubble() {
        let mut app = app();
        app.begin_chat_exchange("hello");
        app.apply(AppMsg::ChatFailed("request failed".into()));
        assert!(!app.chat_pending);
        assert!(app.chat.last().unwrap().is_error);
    }

    #[test]
    fn navigation_is_clamped_to_the_active_panel() {
        let mut app = app();
        app.apply(AppMsg::Users(users(2)));

        app.select_next();
        assert_eq!(app.users_state.selected(), Some(0));
        app.select_next();
        app.select_next();
        assert_eq!(app.users_state.selected(), Some(1), "clamped at the end");

        app.select_previous();
        app.select_previous();
        assert_eq!(app.users_state.selected(), Some(0), "clamped at the start");
    }

    #[test]
    fn navigation_on_an_empty_panel_is_a_noop() {
        let mut app = app();
        app.select_panel(PanelKind::Documents);
        app.select_next();
        app.select_last();
        assert!(app.documents_state.selected().is_none());
    }

    #[test]
    fn visible_businesses_respect_the_filter() {
        let mut app = app();
        app.apply(directory(vec![
            Business {
                business_name: "Island Grill".into(),
                category: "restaurant".into(),
                ..Business::default()
            },
            Business {
                business_name: "Bay Auto Shop".into(),
                category: "services".into(),
                ..Business::default()
            },
        ]));
        assert_eq!(app.businesses_total, 2);
        app.filter.query = "grill".into();
        let visible = app.visible_businesses();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].business_name, "Island Grill");
    }

    #[test]
    fn cycling_categories_walks_the_data_and_clears() {
        let mut app = app();
        app.apply(directory(vec![
            Business {
                category: "restaurant".into(),
                ..Business::default()
            },
            Business {
                category: "retail".into(),
                ..Business::default()
            },
        ]));

        app.cycle_category();
        assert_eq!(app.filter.category, "restaurant");
        app.cycle_category();
        assert_eq!(app.filter.category, "retail");
        app.cycle_category();
        assert_eq!(app.filter.category, "");
    }

    #[test]
    fn visible_pins_skip_missing_coordinates_and_tag_kinds() {
        let mut app = app();
        app.apply(AppMsg::Jobs(vec![
            MapPin {
                title: "clerk".into(),
                latitude: Some(13.5),
                longitude: Some(124.2),
                ..MapPin::default()
            },
            MapPin {
                title: "unplaced".into(),
                ..MapPin::default()
            },
        ]));
        app.apply(AppMsg::Services(vec![MapPin {
            title: "fence repair".into(),
            latitude: Some(13.6),
            longitude: Some(124.1),
            ..MapPin::default()
        }]));

        let pins = app.visible_pins();
        assert_eq!(pins.len(), 2);
        assert_eq!(pins[0].0, "job");
        assert_eq!(pins[1].0, "service");
    }

    #[test]
    fn switching_panels_leaves_filter_edit_mode() {
        let mut app = app();
        app.select_panel(PanelKind::Businesses);
        app.mode = InputMode::FilterEdit;
        app.select_panel(PanelKind::Map);
        assert_eq!(app.mode, InputMode::Normal);
    }
}
