pub(crate) mod cache_padded;
