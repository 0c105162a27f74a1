#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Launch and initialize a daemon process
    Init,
    /// Start a pomodoro
    Pomodoro,
    /// Start a break
    Break,
    /// Stop the running phase
    Stop,
    /// Query the timer's status. Show all information if no flag is specified.
    Query(QueryArguments),
    /// Print the title currently shown
    Title,
    /// Stop the daemon
    Quit,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryArguments {
    /// Show the timer's state
    pub state: bool,
    /// Show the total duration of the running phase
    pub total: bool,
    /// Show the remaining duration of the running phase
    pub remaining: bool,
}
