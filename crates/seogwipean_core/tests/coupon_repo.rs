mod common;

use chrono::{Days, Local};
use common::{date, test_db};
use seogwipean_core::db::ConnectionFactory;
use seogwipean_core::{
    CouponDbViewModel, CouponRepository, CouponStatus, CouponViewModel, KakaoViewModel, Outcome,
    ResultCode, SqliteCouponRepository,
};

fn guest(phone: &str) -> CouponViewModel {
    CouponViewModel {
        user_name: Some("Yoon".to_string()),
        phone: Some(phone.to_string()),
        ..CouponViewModel::default()
    }
}

fn campaign(remaining: i32) -> CouponDbViewModel {
    CouponDbViewModel {
        title: Some("surf 10% off".to_string()),
        description: Some("valid for group lessons".to_string()),
        discount_rate: Some(10),
        remaining: Some(remaining),
        valid_days: Some(30),
        ..CouponDbViewModel::default()
    }
}

#[test]
fn create_coupon_normalizes_phone_and_issues_code() {
    let db = test_db();
    let repo = SqliteCouponRepository::new(&db.factory);

    let created = repo.create_coupon(&guest("010-1234-5678")).into_data().unwrap();
    assert_eq!(created.phone.as_deref(), Some("01012345678"));
    assert_eq!(created.status, Some(CouponStatus::Issued));
    assert_eq!(created.code.as_deref().map(str::len), Some(16));

    let model = repo
        .get_coupon_model(created.id.unwrap())
        .into_data()
        .unwrap()
        .unwrap();
    assert_eq!(model, created);
}

#[test]
fn create_coupon_requires_name_and_phone() {
    let db = test_db();
    let repo = SqliteCouponRepository::new(&db.factory);

    let no_phone = repo.create_coupon(&CouponViewModel {
        phone: None,
        ..guest("")
    });
    assert_eq!(no_phone.reason(), Some("연락처가 존재하지 않습니다."));

    let no_name = repo.create_coupon(&CouponViewModel {
        user_name: None,
        ..guest("01012345678")
    });
    assert_eq!(no_name.reason(), Some("예약자명이 존재하지 않습니다."));

    assert_eq!(
        repo.get_coupon_list(&CouponViewModel::default()),
        Outcome::Success(Vec::new())
    );
}

#[test]
fn campaign_issuance_decrements_and_stops_when_sold_out() {
    let db = test_db();
    let repo = SqliteCouponRepository::new(&db.factory);
    let campaign_id = repo.create_coupon_db(&campaign(1)).into_data().unwrap().id;

    let issued = repo
        .create_coupon(&CouponViewModel {
            coupon_db_id: Some(campaign_id),
            ..guest("01011110000")
        })
        .into_data()
        .unwrap();
    assert_eq!(issued.title.as_deref(), Some("surf 10% off"));
    let today = Local::now().date_naive();
    assert_eq!(
        issued.expire_date,
        today.checked_add_days(Days::new(30))
    );

    let stored_campaign = repo.get_coupon_db(campaign_id).into_data().unwrap().unwrap();
    assert_eq!(stored_campaign.remaining, 0);

    let sold_out = repo.create_coupon(&CouponViewModel {
        coupon_db_id: Some(campaign_id),
        ..guest("01022220000")
    });
    assert_eq!(sold_out.reason(), Some("쿠폰이 모두 소진되었습니다."));

    let unknown = repo.create_coupon(&CouponViewModel {
        coupon_db_id: Some(campaign_id + 1),
        ..guest("01022220000")
    });
    assert_eq!(unknown.reason(), Some("쿠폰 정보가 존재하지 않습니다."));
}

#[test]
fn campaign_rejects_second_issue_to_same_phone() {
    let db = test_db();
    let repo = SqliteCouponRepository::new(&db.factory);
    let campaign_id = repo.create_coupon_db(&campaign(5)).into_data().unwrap().id;
    let request = CouponViewModel {
        coupon_db_id: Some(campaign_id),
        ..guest("010-3333-4444")
    };

    assert!(repo.create_coupon(&request).is_success());
    let duplicate = repo.create_coupon(&request);
    assert_eq!(duplicate.reason(), Some("이미 발급된 쿠폰이 있습니다."));

    let remaining = repo
        .get_coupon_db(campaign_id)
        .into_data()
        .unwrap()
        .unwrap()
        .remaining;
    assert_eq!(remaining, 4);
}

#[test]
fn use_coupon_marks_coupon_used_once() {
    let db = test_db();
    let repo = SqliteCouponRepository::new(&db.factory);
    let created = repo.create_coupon(&guest("01055556666")).into_data().unwrap();

    let used = repo.use_coupon("010-5555-6666").into_data().unwrap();
    assert_eq!(used.id, created.id);
    assert_eq!(used.status, Some(CouponStatus::Used));
    assert!(used.use_date.is_some());

    let again = repo.use_coupon("01055556666");
    assert_eq!(again.reason(), Some("사용 가능한 쿠폰이 존재하지 않습니다."));

    let blank = repo.use_coupon("  ");
    assert_eq!(blank.code(), ResultCode::Fail);
}

#[test]
fn use_coupon_expires_stale_coupons() {
    let db = test_db();
    let repo = SqliteCouponRepository::new(&db.factory);
    let created = repo
        .create_coupon(&CouponViewModel {
            expire_date: Some(date(2020, 1, 1)),
            ..guest("01077778888")
        })
        .into_data()
        .unwrap();

    let outcome = repo.use_coupon("01077778888");
    assert_eq!(outcome.reason(), Some("쿠폰 사용 기간이 만료되었습니다."));

    let stored = repo
        .get_coupon(created.id.unwrap())
        .into_data()
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, CouponStatus::Expired);
    assert_eq!(stored.use_date, None);
}

#[test]
fn get_coupon_list_filters_and_orders_by_creation() {
    let db = test_db();
    let repo = SqliteCouponRepository::new(&db.factory);

    let first = repo.create_coupon(&guest("01012340001")).into_data().unwrap();
    let second = repo.create_coupon(&guest("01012340001")).into_data().unwrap();
    repo.create_coupon(&guest("01012340002")).into_data().unwrap();
    repo.use_coupon("01012340001").into_data().unwrap();

    let for_phone = repo
        .get_coupon_list(&CouponViewModel {
            phone: Some("010-1234-0001".to_string()),
            ..CouponViewModel::default()
        })
        .into_data()
        .unwrap();
    let ids: Vec<_> = for_phone.iter().map(|coupon| Some(coupon.id)).collect();
    assert_eq!(ids, [first.id, second.id]);

    let issued_only = repo
        .get_coupon_list(&CouponViewModel {
            phone: Some("01012340001".to_string()),
            status: Some(CouponStatus::Issued),
            ..CouponViewModel::default()
        })
        .into_data()
        .unwrap();
    assert_eq!(issued_only.len(), 1);
    assert_eq!(Some(issued_only[0].id), second.id);
}

#[test]
fn kakao_lookup_uses_phone_from_utterance() {
    let db = test_db();
    let repo = SqliteCouponRepository::new(&db.factory);
    repo.create_coupon(&guest("01098765432")).into_data().unwrap();
    let latest = repo.create_coupon(&guest("01098765432")).into_data().unwrap();

    let found = repo
        .get_coupon_kakao(&KakaoViewModel {
            user_key: Some("kakao-user".to_string()),
            utterance: Some("내 쿠폰 010-9876-5432".to_string()),
            phone: None,
        })
        .into_data()
        .unwrap()
        .unwrap();
    assert_eq!(found.id, latest.id);

    let no_phone = repo.get_coupon_kakao(&KakaoViewModel::default());
    assert_eq!(no_phone, Outcome::Success(None));

    let unknown = repo.get_coupon_kakao(&KakaoViewModel {
        phone: Some("01000000000".to_string()),
        ..KakaoViewModel::default()
    });
    assert_eq!(unknown, Outcome::Success(None));
}

#[test]
fn update_coupon_db_is_partial() {
    let db = test_db();
    let repo = SqliteCouponRepository::new(&db.factory);
    let created = repo.create_coupon_db(&campaign(3)).into_data().unwrap();

    let updated = repo
        .update_coupon_db(&CouponDbViewModel {
            id: Some(created.id),
            title: Some(" ".to_string()),
            remaining: Some(10),
            discount_rate: Some(0),
            ..CouponDbViewModel::default()
        })
        .into_data()
        .unwrap();
    assert_eq!(updated.title, "surf 10% off");
    assert_eq!(updated.remaining, 10);
    assert_eq!(updated.discount_rate, 10);
    assert_eq!(updated.valid_days, 30);
    assert_eq!(
        repo.get_coupon_db(created.id).into_data().unwrap(),
        Some(updated)
    );

    let missing = repo.update_coupon_db(&CouponDbViewModel {
        id: Some(created.id + 1),
        ..CouponDbViewModel::default()
    });
    assert_eq!(missing.reason(), Some("쿠폰 정보가 존재하지 않습니다."));
}

#[test]
fn create_coupon_db_requires_title_quantity_and_period() {
    let db = test_db();
    let repo = SqliteCouponRepository::new(&db.factory);

    let no_title = repo.create_coupon_db(&CouponDbViewModel {
        title: None,
        ..campaign(3)
    });
    assert_eq!(no_title.reason(), Some("쿠폰명이 존재하지 않습니다."));

    let no_quantity = repo.create_coupon_db(&campaign(0));
    assert_eq!(no_quantity.reason(), Some("쿠폰 수량이 존재하지 않습니다."));

    assert_eq!(repo.get_coupon_db(1), Outcome::Success(None));
}

#[test]
fn failed_campaign_issue_rolls_back_remaining() {
    let db = test_db();
    let repo = SqliteCouponRepository::new(&db.factory);
    let campaign_id = repo.create_coupon_db(&campaign(3)).into_data().unwrap().id;

    db.factory
        .open()
        .unwrap()
        .execute_batch(
            "CREATE TRIGGER reject_coupon_insert BEFORE INSERT ON coupon
             BEGIN
                 SELECT RAISE(ABORT, 'disk quota exceeded');
             END;",
        )
        .unwrap();

    let outcome = repo.create_coupon(&CouponViewModel {
        coupon_db_id: Some(campaign_id),
        ..guest("01011110000")
    });
    assert_eq!(outcome.code(), ResultCode::Exception);
    assert_eq!(outcome.reason(), None);

    let stored = repo.get_coupon_db(campaign_id).into_data().unwrap().unwrap();
    assert_eq!(stored.remaining, 3);
    assert_eq!(
        repo.get_coupon_list(&CouponViewModel::default()),
        Outcome::Success(Vec::new())
    );
}

#[test]
fn failed_redeem_leaves_coupon_issued() {
    let db = test_db();
    let repo = SqliteCouponRepository::new(&db.factory);
    let id = repo
        .create_coupon(&guest("01012345678"))
        .into_data()
        .unwrap()
        .id
        .unwrap();

    db.factory
        .open()
        .unwrap()
        .execute_batch(
            "CREATE TRIGGER reject_coupon_update BEFORE UPDATE ON coupon
             BEGIN
                 SELECT RAISE(ABORT, 'disk quota exceeded');
             END;",
        )
        .unwrap();

    let outcome = repo.use_coupon("010-1234-5678");
    assert_eq!(outcome.code(), ResultCode::Exception);
    assert_eq!(outcome.reason(), None);

    let stored = repo.get_coupon(id).into_data().unwrap().unwrap();
    assert_eq!(stored.status, CouponStatus::Issued);
    assert_eq!(stored.use_date, None);
}

#[test]
fn dropped_tables_yield_exception_without_reason() {
    let db = test_db();
    let repo = SqliteCouponRepository::new(&db.factory);
    let campaign_id = repo.create_coupon_db(&campaign(3)).into_data().unwrap().id;
    let coupon_id = repo
        .create_coupon(&guest("01012345678"))
        .into_data()
        .unwrap()
        .id
        .unwrap();

    db.factory
        .open()
        .unwrap()
        .execute_batch("DROP TABLE coupon; DROP TABLE coupon_db;")
        .unwrap();

    let kakao = KakaoViewModel {
        phone: Some("01012345678".to_string()),
        ..KakaoViewModel::default()
    };
    let outcomes = [
        (repo.get_coupon(coupon_id).code(), "get_coupon"),
        (repo.get_coupon_model(coupon_id).code(), "get_coupon_model"),
        (
            repo.get_coupon_list(&CouponViewModel::default()).code(),
            "get_coupon_list",
        ),
        (repo.create_coupon(&guest("01099990000")).code(), "create_coupon"),
        (repo.use_coupon("01012345678").code(), "use_coupon"),
        (repo.get_coupon_kakao(&kakao).code(), "get_coupon_kakao"),
        (repo.get_coupon_db(campaign_id).code(), "get_coupon_db"),
        (repo.create_coupon_db(&campaign(1)).code(), "create_coupon_db"),
        (
            repo.update_coupon_db(&CouponDbViewModel {
                id: Some(campaign_id),
                remaining: Some(5),
                ..CouponDbViewModel::default()
            })
            .code(),
            "update_coupon_db",
        ),
    ];
    for (code, op) in outcomes {
        assert_eq!(code, ResultCode::Exception, "{op}");
    }
    assert_eq!(repo.use_coupon("01012345678").reason(), None);
}
