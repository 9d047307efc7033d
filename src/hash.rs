use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Hash whatever `f` feeds into a fresh hasher.
pub fn stable_hash_with(f: impl FnOnce(&mut DefaultHasher)) -> u64 {
    let mut hasher = DefaultHasher::new();
    f(&mut hasher);
    hasher.finish()
}

/// Order-sensitive hash over a sequence of lines.
pub fn stable_hash_lines<'a, I>(lines: I) -> u64
where
    I: IntoIterator<Item = &'a str>,
{
    stable_hash_with(|hasher| {
        for line in lines {
            line.hash(hasher);
        }
    })
}
