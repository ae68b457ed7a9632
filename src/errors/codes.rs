pub struct ErrorCode;

impl ErrorCode {
    // Config errors: C1xx
    pub const CONFIG_READ_FAILED: &'static str = "C100";
    pub const CONFIG_PARSE_FAILED: &'static str = "C101";

    // Client-side validation errors: V1xx
    pub const VALIDATION_EMPTY_NAME: &'static str = "V100";
    pub const VALIDATION_UNKNOWN_ACTION: &'static str = "V101";
    pub const VALIDATION_ACTION_NOT_OFFERED: &'static str = "V102";
    pub const VALIDATION_UNKNOWN_CONTAINER: &'static str = "V103";

    // Transport errors: T1xx
    pub const TRANSPORT_FAILED: &'static str = "T100";

    // Backend-reported errors: B1xx
    pub const BACKEND_REPORTED: &'static str = "B100";

    // Container engine errors: E1xx
    pub const ENGINE_NOT_CONNECTED: &'static str = "E100";
    pub const ENGINE_CONTAINER_NOT_FOUND: &'static str = "E101";
    pub const ENGINE_IMAGE_NOT_FOUND: &'static str = "E102";
    pub const ENGINE_INDEX_FILE_MISSING: &'static str = "E103";
    pub const ENGINE_API_FAILED: &'static str = "E104";
    pub const ENGINE_INVALID_ACTION: &'static str = "E105";
    pub const ENGINE_INVALID_REQUEST: &'static str = "E106";
}
