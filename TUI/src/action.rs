/// User actions that can be triggered by commands or key presses.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Move the ring cursor outwards
    CursorUp,
    /// Move the ring cursor inwards
    CursorDown,
    /// Select the layer under the cursor
    SelectCursor,
    /// Select a layer by id
    Select {
        id: String,
    },
    /// Clear the selection
    Deselect,
    /// Generate a checklist for the selected layer
    Generate,
    /// Copy the generated checklist to the clipboard
    CopyChecklist,
    /// Show or hide the activity log
    ToggleActivity,
    /// Show help message
    Help,
    /// Quit application
    Quit,
}
