/// Upload endpoint used when no configuration overrides it.
pub const DEFAULT_UPLOAD_URL: &str = "http://localhost:3333/uploads";

/// Multipart field name carrying the file payload.
pub const UPLOAD_FIELD_NAME: &str = "file";

/// Default bounding box for compressed images, in pixels.
pub const DEFAULT_MAX_DIMENSION: u32 = 1000;

/// Default encoder quality (1-100).
pub const DEFAULT_QUALITY: u8 = 80;

/// Size of each body slice handed to the HTTP stack (64 KiB).
///
/// Progress is reported once per slice, so this also sets the
/// granularity of transmission progress.
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// MIME type used when the file extension is not a known image type.
pub const FALLBACK_MIME_TYPE: &str = "application/octet-stream";
