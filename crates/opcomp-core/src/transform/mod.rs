pub mod compiler;
pub mod content;
pub mod name_normalizer;
pub mod params;
pub mod path_template;
pub mod response_classifier;
pub mod schema_resolver;
pub mod security;
pub mod serializer;

pub use compiler::{CompileOptions, Compiler, compile};
pub use security::{basic_authorization, bearer_authorization};
pub use serializer::{SerializedParameter, cookie_header, encode_form, serialize_parameter};

/// Build a JSON pointer (`#/a/b`) from unescaped segments.
pub fn json_pointer(segments: &[&str]) -> String {
    let mut pointer = String::from("#");
    for segment in segments {
        pointer.push('/');
        pointer.push_str(&segment.replace('~', "~0").replace('/', "~1"));
    }
    pointer
}
