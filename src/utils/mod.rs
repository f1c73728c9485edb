pub(crate) mod varint;
