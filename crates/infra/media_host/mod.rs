pub mod cloudinary;
