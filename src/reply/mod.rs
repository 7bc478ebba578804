//! Reply text shared by the chat adapters and the web API.

pub mod formatter;

pub use formatter::{
    capitalize_words, passage_label, split_message, ReplyComposer, ReplyKind, MESSENGER_MAX_LEN,
    TELEGRAM_MAX_LEN,
};
