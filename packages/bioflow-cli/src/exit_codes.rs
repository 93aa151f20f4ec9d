use bioflow_rs::BioflowError;

pub const SUCCESS: i32 = 0;
pub const INPUT_ERROR: i32 = 1;
pub const EXECUTION_ERROR: i32 = 2;
/// Some batch items failed, others succeeded
pub const PARTIAL_FAILURE: i32 = 3;

/// Bad input data maps to INPUT_ERROR, everything else to EXECUTION_ERROR
pub fn for_error(error: &BioflowError) -> i32 {
    match error {
        BioflowError::EmptySignal(_)
        | BioflowError::InvalidParameter(_)
        | BioflowError::FileNotFound(_)
        | BioflowError::UnsupportedFileType(_)
        | BioflowError::ParseError(_) => INPUT_ERROR,
        BioflowError::IoError(_) | BioflowError::Json(_) => EXECUTION_ERROR,
    }
}
