use std::collections::HashMap;

pub type FastHashMap<K, V> = HashMap<K, V, ahash::RandomState>;
