mod hash;

pub(crate) use hash::transaction_id;
