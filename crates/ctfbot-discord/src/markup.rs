// Discord message markup

use ctfbot_core::{Snowflake, TimestampStyle};

/// Style letter understood by Discord's timestamp markup
pub fn style_code(style: TimestampStyle) -> char {
    match style {
        TimestampStyle::ShortDate => 'd',
        TimestampStyle::ShortTime => 't',
        TimestampStyle::Relative => 'R',
        TimestampStyle::LongDateTime => 'f',
    }
}

/// `<t:UNIX:STYLE>`, rendered in each reader's own timezone
pub fn timestamp(unix: i64, style: TimestampStyle) -> String {
    format!("<t:{}:{}>", unix, style_code(style))
}

pub fn user_mention(id: Snowflake) -> String {
    format!("<@{}>", id)
}
