//! Domain records and the request types that produce them
//!
//! `*Request` types are what clients send. Each has a `validate` method that
//! yields the typed input the service accepts.

mod asset;
mod element;
mod file;
mod user;

pub use asset::{Asset, CreateAsset, CreateAssetRequest, UpdateAsset, UpdateAssetRequest};
pub use element::{
    AssetPlacement, CreateElement, CreateElementRequest, Element, ElementChanges, ElementKind,
    ElementProps, LineProps, RawProps, RectangleProps, TextProps, UpdateElement,
    UpdateElementRequest,
};
pub use file::{
    CanvasData, CanvasObject, CanvasObjectKind, CreateFile, CreateFileRequest, File, UpdateFile,
    UpdateFileRequest, Viewport,
};
pub use user::{User, UserId, UserProfile, UserSync};
