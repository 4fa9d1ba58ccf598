//! Tests for layer error types.

use std::any::Any;

use strata::LayerError;
use strata::error::extract_panic_message;

#[test]
fn test_extract_panic_message_str() {
    let panic: Box<dyn Any + Send> = Box::new("test panic message");
    assert_eq!(extract_panic_message(&panic), "test panic message");
}

#[test]
fn test_extract_panic_message_string() {
    let panic: Box<dyn Any + Send> = Box::new(String::from("test panic message"));
    assert_eq!(extract_panic_message(&panic), "test panic message");
}

#[test]
fn test_extract_panic_message_unknown() {
    let panic: Box<dyn Any + Send> = Box::new(42i32);
    assert_eq!(extract_panic_message(&panic), "Unknown panic");
}

#[test]
fn test_not_found_display() {
    let display = LayerError::not_found("prefab/dialog/DlgShop").to_string();
    assert_eq!(display, "template not found: prefab/dialog/DlgShop");
}

#[tokio::test]
async fn test_task_panic_becomes_task_failed() {
    let task = tokio::spawn(async { panic!("boom") });
    let err: LayerError = task.await.unwrap_err().into();
    assert_eq!(
        err,
        LayerError::TaskFailed {
            message: "boom".to_string()
        }
    );
}
