mod button;
mod label_and_text;
mod text_input;

pub(crate) use button::button;
pub(crate) use label_and_text::label_and_text;
pub(crate) use text_input::TextInput;
