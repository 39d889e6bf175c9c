#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    Home,
    Layers,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Rings,
    Command,
}

#[derive(Default)]
pub struct UIState {
    pub screen: Screen,
    pub focus: Focus,

    // Command line input (starts with '/')
    pub input: String,

    // Index into the outermost-first ring order
    pub cursor: usize,

    pub status_message: Option<String>,
    pub status_set_tick: u64,

    pub show_activity: bool,
    pub show_help: bool,
}

impl UIState {
    pub fn new() -> Self {
        Self::default()
    }
}
