//! Data model for inspection documents

pub mod inspection;

pub use inspection::{
    Comment, Inspection, InspectionDocument, InspectionStatus, LineItem, Photo, Section,
};
