use coffee_workflow::application::engine::Submission;
use coffee_workflow::domain::approval::{ApprovalCheck, ApprovalStage, DenialReason};
use coffee_workflow::domain::request::{RequestKind, RequestStatus};
use coffee_workflow::domain::status::StatusLabel;
use coffee_workflow::error::WorkflowError;
use rust_decimal_macros::dec;

mod common;

#[tokio::test]
async fn test_admin_requestor_blocked_at_every_stage() {
    let engine = common::engine();
    let okello = common::actor("okello");

    engine
        .submit_request(
            &okello,
            Submission {
                id: 1,
                kind: RequestKind::Expense,
                department: None,
                amount: dec!(750000),
                description: Some("Office generator fuel".to_string()),
            },
        )
        .await
        .unwrap();

    // The requestor is refused before any role check.
    for stage in [ApprovalStage::Finance, ApprovalStage::Admin1, ApprovalStage::Admin2] {
        let check = engine.check_approval(1, &okello).await.unwrap();
        assert_eq!(check, ApprovalCheck::Denied(DenialReason::SelfApproval));
        assert!(matches!(
            engine.approve(1, &okello).await,
            Err(WorkflowError::ApprovalDenied(DenialReason::SelfApproval))
        ));

        let signer = match stage {
            ApprovalStage::Finance => "amina",
            ApprovalStage::Admin1 => "byaruhanga",
            ApprovalStage::Admin2 => break,
        };
        engine.approve(1, &common::actor(signer)).await.unwrap();
    }

    // One admin is left for the second admin stage and it is the requestor.
    let request = engine.request(1).await.unwrap();
    assert_eq!(request.status, RequestStatus::Admin1Approved);
    assert_eq!(engine.classify(1).await.unwrap(), StatusLabel::NeedsAdmin);
}

#[tokio::test]
async fn test_same_admin_cannot_sign_twice() {
    let engine = common::engine();
    engine
        .submit_request(
            &common::actor("kato"),
            Submission {
                id: 7,
                kind: RequestKind::Payment,
                department: None,
                amount: dec!(3000000),
                description: None,
            },
        )
        .await
        .unwrap();

    engine.approve(7, &common::actor("amina")).await.unwrap();
    engine.approve(7, &common::actor("okello")).await.unwrap();

    let check = engine.check_approval(7, &common::actor("okello")).await.unwrap();
    assert!(!check.can_approve());
    assert_eq!(
        check.reason(),
        Some(&DenialReason::AlreadyApproved(ApprovalStage::Admin1))
    );

    let check = engine
        .check_approval(7, &common::actor("byaruhanga"))
        .await
        .unwrap();
    assert_eq!(check, ApprovalCheck::Allowed(ApprovalStage::Admin2));
}

#[tokio::test]
async fn test_staff_cannot_approve_and_finance_cannot_sign_admin_stage() {
    let engine = common::engine();
    engine
        .submit_request(
            &common::actor("kato"),
            Submission {
                id: 2,
                kind: RequestKind::Expense,
                department: None,
                amount: dec!(90000),
                description: None,
            },
        )
        .await
        .unwrap();

    assert!(matches!(
        engine.approve(2, &common::actor("nambi")).await,
        Err(WorkflowError::ApprovalDenied(DenialReason::MissingRole { .. }))
    ));
    engine.approve(2, &common::actor("amina")).await.unwrap();
    assert!(matches!(
        engine.approve(2, &common::actor("sarah")).await,
        Err(WorkflowError::ApprovalDenied(DenialReason::MissingRole { .. }))
    ));
}

#[tokio::test]
async fn test_requestor_cannot_reject_or_pay() {
    let engine = common::engine();
    let amina = common::actor("amina");
    engine
        .deposit_cash(&amina, amina.department, dec!(5000000), None)
        .await
        .unwrap();
    engine
        .submit_request(
            &amina,
            Submission {
                id: 3,
                kind: RequestKind::Payment,
                department: None,
                amount: dec!(100000),
                description: None,
            },
        )
        .await
        .unwrap();

    assert!(matches!(
        engine.reject(3, &amina, "changed my mind").await,
        Err(WorkflowError::Unauthorized(_))
    ));

    engine.approve(3, &common::actor("sarah")).await.unwrap();
    engine.approve(3, &common::actor("okello")).await.unwrap();
    engine.approve(3, &common::actor("byaruhanga")).await.unwrap();

    assert!(matches!(
        engine
            .process_payment(3, &amina, coffee_workflow::domain::cash::PaymentMethod::Cash, None)
            .await,
        Err(WorkflowError::Unauthorized(_))
    ));
    assert_eq!(
        engine.request(3).await.unwrap().status,
        RequestStatus::FullyApproved
    );
}
