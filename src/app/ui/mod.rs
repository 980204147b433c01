pub(super) mod panels;
pub(super) mod range;
pub(super) mod taxonomy;
