#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Ping,
    PrefixExtract,
    TermsParse,
    TermsTranslate,
    TermsMerge,
    GridRows,
    GridEdit,
    GridExport,
    SessionState,
    Unknown,
}

impl From<&str> for Command {
    fn from(s: &str) -> Self {
        match s {
            "ping" => Command::Ping,
            "prefix.extract" => Command::PrefixExtract,
            "terms.parse" => Command::TermsParse,
            "terms.translate" => Command::TermsTranslate,
            "terms.merge" => Command::TermsMerge,
            "grid.rows" => Command::GridRows,
            "grid.edit" => Command::GridEdit,
            "grid.export" => Command::GridExport,
            "session.state" => Command::SessionState,
            _ => Command::Unknown,
        }
    }
}
