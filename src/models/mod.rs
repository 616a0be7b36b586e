pub mod photo;

pub use photo::{
    decode_collection, encode_collection, format_coordinate, Coordinates, PhotoRecord,
    MAPS_BASE_URL,
};
