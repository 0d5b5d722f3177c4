//! `multipart/related` bodies for Drive uploads: a JSON metadata part
//! followed by the media part.

pub(crate) struct RelatedBody {
    boundary: String,
    body: Vec<u8>,
}

impl RelatedBody {
    pub(crate) fn new(metadata: &serde_json::Value, media: &[u8], media_type: &str) -> Self {
        let boundary = format!("snipvault-{}", uuid::Uuid::new_v4().simple());

        let mut body = Vec::with_capacity(media.len() + 256);
        body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
        body.extend_from_slice(b"Content-Type: application/json; charset=UTF-8\r\n\r\n");
        body.extend_from_slice(metadata.to_string().as_bytes());
        body.extend_from_slice(format!("\r\n--{}\r\n", boundary).as_bytes());
        body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", media_type).as_bytes());
        body.extend_from_slice(media);
        body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());

        Self { boundary, body }
    }

    pub(crate) fn content_type(&self) -> String {
        format!("multipart/related; boundary={}", self.boundary)
    }

    pub(crate) fn bytes(&self) -> Vec<u8> {
        self.body.clone()
    }
}
