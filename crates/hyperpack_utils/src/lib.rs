pub mod base64;
pub mod bitset;
pub mod concat_string;
pub mod ecmascript;
pub mod hash_placeholder;
pub mod indexmap;
pub mod path_ext;
pub mod rayon;
pub mod rstr;
pub mod sanitize_file_name;
pub mod xxhash;
