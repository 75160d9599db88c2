mod ninja;
mod writer;

pub use ninja::{detect_linker_script, Ninja};
pub use writer::{escape_path, NinjaBuild, NinjaFile, NinjaItem, NinjaRspFile, NinjaRule};
