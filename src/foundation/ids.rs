/// Opaque handle to a view owned by the [`ViewBackend`](crate::ViewBackend).
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct ViewId(pub u64);

/// Logical id of a container view, as known to the host layout.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct ContainerId(pub i32);

impl ContainerId {
    /// The host's default content container.
    pub const DEFAULT: Self = Self(-1);

    /// Whether this id names the host's default container.
    pub fn is_default(self) -> bool {
        self == Self::DEFAULT
    }
}

/// Handle to a layout resource the backend knows how to inflate. Zero is reserved.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct LayoutRes(pub u32);

/// Handle to an animation resource the backend knows how to load. Zero is reserved.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct AnimRes(pub u32);

/// Runtime identity of a stack entry. Not persisted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntryId(pub u64);

pub(crate) fn res_to_raw(res: Option<u32>) -> i32 {
    res.and_then(|v| i32::try_from(v).ok()).unwrap_or(0)
}

pub(crate) fn raw_to_res(raw: i32) -> Option<u32> {
    u32::try_from(raw).ok().filter(|v| *v != 0)
}
