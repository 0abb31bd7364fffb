use std::{
    fmt::Display,
    sync::{LazyLock, RwLock},
};

use nu_ansi_term::Color;

pub static COLOR: LazyLock<RwLock<bool>> = LazyLock::new(|| RwLock::new(true));
pub static PROGRESS: LazyLock<RwLock<bool>> = LazyLock::new(|| RwLock::new(true));

fn read_flag(flag: &RwLock<bool>) -> bool {
    *flag.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn write_flag(flag: &RwLock<bool>, value: bool) {
    *flag.write().unwrap_or_else(|poisoned| poisoned.into_inner()) = value;
}

pub fn progress_enabled() -> bool {
    read_flag(&PROGRESS)
}

pub fn set_progress(enabled: bool) {
    write_flag(&PROGRESS, enabled);
}

pub fn set_color(enabled: bool) {
    write_flag(&COLOR, enabled);
}

pub struct Colored<T: Display>(pub Color, pub T);

impl<T: Display> Display for Colored<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if read_flag(&COLOR) {
            write!(f, "{}", self.0.prefix())?;
            self.1.fmt(f)?;
            write!(f, "{}", self.0.suffix())
        } else {
            self.1.fmt(f)
        }
    }
}
