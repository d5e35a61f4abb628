pub(crate) mod bundle;
pub(crate) mod codec;
pub(crate) mod parcel;
pub(crate) mod value;
pub(crate) mod view_model;
