use std::collections::{BTreeMap, BTreeSet};

use chrono::{Days, NaiveDate};
use ironplan_domain::{
    self as domain, BodyMetricService, CalendarRepository, CalendarService, ExerciseRepository,
    ExerciseService, GymService, ProgramRepository, ProgramService, ReportService, UserService,
    WorkoutService,
};
use pretty_assertions::assert_eq;
use rstest::rstest;

use crate::{
    Sqlite,
    tests::data::{
        BARBELL, PUSH_UP, SQUAT, USER, USER_2, create_equipment, gym_equipment, ppl,
        scheduled_day, sqlite,
    },
};

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
}

/// Program of `USER` with the first week's days scheduled on the given days of March.
async fn calendar(days: &[u32]) -> (Sqlite, domain::Program, Vec<domain::ScheduledDay>) {
    let db = sqlite().await;
    let program = db.create_program(ppl(USER.id)).await.unwrap();
    let mut scheduled = vec![];
    for (day, program_day) in days.iter().zip(program.weeks[0].days.iter().cycle()) {
        scheduled.push(
            db.create_scheduled_day(scheduled_day(&program, program_day.id, date(*day)))
                .await
                .unwrap(),
        );
    }
    (db, program, scheduled)
}

async fn dates(
    service: &domain::Service<Sqlite>,
) -> BTreeMap<domain::ScheduledDayID, NaiveDate> {
    service
        .get_calendar_events(USER.id)
        .await
        .unwrap()
        .into_iter()
        .map(|e| (e.id, e.date))
        .collect()
}

fn request(
    day: &domain::ScheduledDay,
    date: NaiveDate,
    resolution: Option<domain::Resolution>,
    conflict: Option<&domain::ScheduledDay>,
) -> domain::RescheduleRequest {
    domain::RescheduleRequest {
        id: day.id,
        date,
        resolution,
        conflict_id: conflict.map(|c| c.id),
    }
}

#[tokio::test]
async fn test_reschedule_to_free_date() {
    let (db, _, days) = calendar(&[1, 2]).await;
    let service = domain::Service::new(db);

    assert_eq!(
        service
            .reschedule(USER.id, request(&days[0], date(5), None, None))
            .await
            .unwrap(),
        domain::RescheduleOutcome::Moved
    );
    assert_eq!(
        dates(&service).await,
        BTreeMap::from([(days[0].id, date(5)), (days[1].id, date(2))])
    );
}

#[tokio::test]
async fn test_reschedule_to_same_date() {
    let (db, _, days) = calendar(&[1, 2]).await;
    let service = domain::Service::new(db);

    assert_eq!(
        service
            .reschedule(USER.id, request(&days[0], date(1), None, None))
            .await
            .unwrap(),
        domain::RescheduleOutcome::Moved
    );
    assert_eq!(
        dates(&service).await,
        BTreeMap::from([(days[0].id, date(1)), (days[1].id, date(2))])
    );
}

#[tokio::test]
async fn test_reschedule_ignores_other_programs() {
    let (db, _, days) = calendar(&[1]).await;
    let other = db.create_program(ppl(USER.id)).await.unwrap();
    let other_day = db
        .create_scheduled_day(scheduled_day(&other, other.weeks[0].days[0].id, date(2)))
        .await
        .unwrap();
    let service = domain::Service::new(db);

    assert_eq!(
        service
            .reschedule(USER.id, request(&days[0], date(2), None, None))
            .await
            .unwrap(),
        domain::RescheduleOutcome::Moved
    );
    assert_eq!(
        dates(&service).await,
        BTreeMap::from([(days[0].id, date(2)), (other_day.id, date(2))])
    );
}

#[tokio::test]
async fn test_reschedule_reports_conflict() {
    let (db, _, days) = calendar(&[1, 2]).await;
    let service = domain::Service::new(db);

    assert_eq!(
        service
            .reschedule(USER.id, request(&days[0], date(2), None, None))
            .await
            .unwrap(),
        domain::RescheduleOutcome::Conflict {
            conflict_id: days[1].id,
            existing_day_name: "Pull".into(),
        }
    );
    assert_eq!(
        dates(&service).await,
        BTreeMap::from([(days[0].id, date(1)), (days[1].id, date(2))])
    );
}

#[tokio::test]
async fn test_reschedule_swap() {
    let (db, _, days) = calendar(&[1, 2]).await;
    let service = domain::Service::new(db);
    let swap = Some(domain::Resolution::Swap);

    assert_eq!(
        service
            .reschedule(USER.id, request(&days[0], date(2), swap, Some(&days[1])))
            .await
            .unwrap(),
        domain::RescheduleOutcome::Swapped
    );
    assert_eq!(
        dates(&service).await,
        BTreeMap::from([(days[0].id, date(2)), (days[1].id, date(1))])
    );

    assert_eq!(
        service
            .reschedule(USER.id, request(&days[0], date(1), swap, Some(&days[1])))
            .await
            .unwrap(),
        domain::RescheduleOutcome::Swapped
    );
    assert_eq!(
        dates(&service).await,
        BTreeMap::from([(days[0].id, date(1)), (days[1].id, date(2))])
    );
}

#[tokio::test]
async fn test_reschedule_shift() {
    let (db, _, days) = calendar(&[1, 2, 3]).await;
    let service = domain::Service::new(db);

    assert_eq!(
        service
            .reschedule(
                USER.id,
                request(
                    &days[0],
                    date(2),
                    Some(domain::Resolution::Shift),
                    Some(&days[1])
                )
            )
            .await
            .unwrap(),
        domain::RescheduleOutcome::Shifted { date: date(4) }
    );
    assert_eq!(
        dates(&service).await,
        BTreeMap::from([
            (days[0].id, date(2)),
            (days[1].id, date(4)),
            (days[2].id, date(3))
        ])
    );
}

#[tokio::test]
async fn test_reschedule_swap_onto_double_booked_date() {
    let (db, _, days) = calendar(&[1, 1, 2]).await;
    let service = domain::Service::new(db);

    assert_eq!(
        service
            .reschedule(
                USER.id,
                request(
                    &days[0],
                    date(2),
                    Some(domain::Resolution::Swap),
                    Some(&days[2])
                )
            )
            .await
            .unwrap(),
        domain::RescheduleOutcome::Swapped
    );
    assert_eq!(
        dates(&service).await,
        BTreeMap::from([
            (days[0].id, date(2)),
            (days[1].id, date(1)),
            (days[2].id, date(1))
        ])
    );
}

#[tokio::test]
async fn test_reschedule_shift_onto_double_booked_date() {
    let (db, _, days) = calendar(&[1, 2, 2]).await;
    let service = domain::Service::new(db);

    assert_eq!(
        service
            .reschedule(
                USER.id,
                request(
                    &days[0],
                    date(2),
                    Some(domain::Resolution::Shift),
                    Some(&days[1])
                )
            )
            .await
            .unwrap(),
        domain::RescheduleOutcome::Shifted { date: date(3) }
    );
    assert_eq!(
        dates(&service).await,
        BTreeMap::from([
            (days[0].id, date(2)),
            (days[1].id, date(3)),
            (days[2].id, date(2))
        ])
    );
}

#[rstest]
#[case::swap(domain::Resolution::Swap)]
#[case::shift(domain::Resolution::Shift)]
#[tokio::test]
async fn test_reschedule_resolution_without_conflict(#[case] resolution: domain::Resolution) {
    let (db, _, days) = calendar(&[1, 2]).await;
    let service = domain::Service::new(db);

    assert_eq!(
        service
            .reschedule(
                USER.id,
                request(&days[0], date(5), Some(resolution), Some(&days[1]))
            )
            .await
            .unwrap(),
        domain::RescheduleOutcome::Moved
    );
    assert_eq!(
        dates(&service).await,
        BTreeMap::from([(days[0].id, date(5)), (days[1].id, date(2))])
    );
}

#[tokio::test]
async fn test_reschedule_conflict_of_other_user() {
    let (db, _, days) = calendar(&[1, 2]).await;
    let foreign = db.create_program(ppl(USER_2.id)).await.unwrap();
    let foreign_day = db
        .create_scheduled_day(scheduled_day(
            &foreign,
            foreign.weeks[0].days[0].id,
            date(1),
        ))
        .await
        .unwrap();
    let service = domain::Service::new(db);

    assert!(matches!(
        service
            .reschedule(
                USER.id,
                request(
                    &days[0],
                    date(2),
                    Some(domain::Resolution::Swap),
                    Some(&foreign_day)
                )
            )
            .await,
        Err(domain::RescheduleError::ConflictNotFound)
    ));
    assert_eq!(
        dates(&service).await,
        BTreeMap::from([(days[0].id, date(1)), (days[1].id, date(2))])
    );
}

#[rstest]
#[case::last_date_free(364, Some(365))]
#[case::all_dates_occupied(365, None)]
#[tokio::test]
async fn test_reschedule_shift_search_bound(
    #[case] occupied_days: u64,
    #[case] expected_offset: Option<u64>,
) {
    let target = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let db = sqlite().await;
    let program = db.create_program(ppl(USER.id)).await.unwrap();
    let day_id = program.weeks[0].days[0].id;
    let dragged = db
        .create_scheduled_day(scheduled_day(&program, day_id, date(1)))
        .await
        .unwrap();
    let conflict = db
        .create_scheduled_day(scheduled_day(&program, day_id, target))
        .await
        .unwrap();
    for offset in 1..=occupied_days {
        db.create_scheduled_day(scheduled_day(
            &program,
            day_id,
            target + Days::new(offset),
        ))
        .await
        .unwrap();
    }
    let service = domain::Service::new(db);

    let result = service
        .reschedule(
            USER.id,
            request(
                &dragged,
                target,
                Some(domain::Resolution::Shift),
                Some(&conflict),
            ),
        )
        .await;

    match expected_offset {
        Some(offset) => assert_eq!(
            result.unwrap(),
            domain::RescheduleOutcome::Shifted {
                date: target + Days::new(offset)
            }
        ),
        None => {
            assert!(matches!(
                result,
                Err(domain::RescheduleError::NoAvailableDate)
            ));
            assert_eq!(dates(&service).await[&dragged.id], date(1));
        }
    }
}

#[tokio::test]
async fn test_reschedule_errors() {
    let (db, _, days) = calendar(&[1, 2]).await;
    let service = domain::Service::new(db);

    assert!(matches!(
        service
            .reschedule(
                USER.id,
                request(&days[0], date(2), Some(domain::Resolution::Swap), None)
            )
            .await,
        Err(domain::RescheduleError::MissingData)
    ));
    assert!(matches!(
        service
            .reschedule(
                USER.id,
                domain::RescheduleRequest {
                    conflict_id: Some(99.into()),
                    ..request(&days[0], date(2), Some(domain::Resolution::Swap), None)
                }
            )
            .await,
        Err(domain::RescheduleError::ConflictNotFound)
    ));
    assert!(matches!(
        service
            .reschedule(USER_2.id, request(&days[0], date(5), None, None))
            .await,
        Err(domain::RescheduleError::NotFound)
    ));
    assert_eq!(
        dates(&service).await,
        BTreeMap::from([(days[0].id, date(1)), (days[1].id, date(2))])
    );
}

#[tokio::test]
async fn test_missing_days() {
    let db = sqlite().await;
    let program = db.create_program(ppl(USER.id)).await.unwrap();
    let service = domain::Service::new(db);
    let [week_1, week_2] = [&program.weeks[0], &program.weeks[1]];

    let domain::ScheduleOutcome::Scheduled(instance) = service
        .schedule_program(
            USER.id,
            domain::ScheduleRequest {
                program_id: program.id,
                name: None,
                gym_id: None,
                mappings: vec![
                    (week_1.days[0].id, date(4)),
                    (week_1.days[1].id, date(6)),
                    (week_2.days[0].id, date(11)),
                    (week_2.days[2].id, date(15)),
                ],
                force: false,
            },
        )
        .await
        .unwrap()
    else {
        panic!("expected scheduled program");
    };

    assert_eq!(instance.name, "PPL");
    assert_eq!(instance.scheduled_date, date(4));
    assert_eq!(instance.scheduled_days.len(), 4);
    assert_eq!(
        service.get_missing_days(USER.id).await.unwrap(),
        vec![
            domain::MissingDay {
                instance_id: instance.id,
                program_day_id: week_1.days[2].id,
                program_name: "PPL".into(),
                day_name: "Legs".into(),
                week_number: 1,
                gym_name: None,
            },
            domain::MissingDay {
                instance_id: instance.id,
                program_day_id: week_2.days[1].id,
                program_name: "PPL".into(),
                day_name: "Pull".into(),
                week_number: 2,
                gym_name: None,
            },
        ]
    );

    let domain::ScheduleOutcome::Scheduled(day) = service
        .schedule_missing_day(USER.id, instance.id, week_1.days[2].id, date(8), false)
        .await
        .unwrap()
    else {
        panic!("expected scheduled day");
    };

    assert_eq!(day.instance_id, Some(instance.id));
    assert_eq!(
        service
            .get_missing_days(USER.id)
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.program_day_id)
            .collect::<Vec<_>>(),
        vec![week_2.days[1].id]
    );
    assert!(matches!(
        service
            .schedule_missing_day(USER.id, instance.id, week_1.days[2].id, date(9), false)
            .await,
        Err(domain::ScheduleError::AlreadyScheduled)
    ));
    assert_eq!(service.get_missing_days(USER_2.id).await.unwrap(), vec![]);
}

#[tokio::test]
async fn test_schedule_program_conflicts() {
    let (db, program, days) = calendar(&[4]).await;
    let service = domain::Service::new(db);
    let schedule = |force| domain::ScheduleRequest {
        program_id: program.id,
        name: Some("Spring block".into()),
        gym_id: None,
        mappings: vec![
            (program.weeks[0].days[0].id, date(4)),
            (program.weeks[0].days[1].id, date(5)),
        ],
        force,
    };

    assert_eq!(
        service.schedule_program(USER.id, schedule(false)).await.unwrap(),
        domain::ScheduleOutcome::Conflicts(vec![domain::ScheduleConflict {
            date: date(4),
            existing_day: "Push".into(),
            new_day: "Push".into(),
        }])
    );
    assert_eq!(service.get_program_instances(USER.id).await.unwrap(), vec![]);

    let domain::ScheduleOutcome::Scheduled(instance) =
        service.schedule_program(USER.id, schedule(true)).await.unwrap()
    else {
        panic!("expected scheduled program");
    };

    assert_eq!(instance.name, "Spring block");
    assert_eq!(dates(&service).await.len(), 3);
    assert!(dates(&service).await.contains_key(&days[0].id));
    assert!(matches!(
        service.schedule_program(USER_2.id, schedule(true)).await,
        Err(domain::ScheduleError::ProgramNotFound)
    ));
}

#[tokio::test]
async fn test_schedule_program_invalid_mappings() {
    let db = sqlite().await;
    let program = db.create_program(ppl(USER.id)).await.unwrap();
    let other = db.create_program(ppl(USER.id)).await.unwrap();
    let service = domain::Service::new(db);
    let schedule = |mappings| domain::ScheduleRequest {
        program_id: program.id,
        name: None,
        gym_id: None,
        mappings,
        force: false,
    };
    let push = program.weeks[0].days[0].id;

    assert!(matches!(
        service.schedule_program(USER.id, schedule(vec![])).await,
        Err(domain::ScheduleError::MissingData)
    ));
    assert!(matches!(
        service
            .schedule_program(
                USER.id,
                schedule(vec![(other.weeks[0].days[0].id, date(1))])
            )
            .await,
        Err(domain::ScheduleError::InvalidDay)
    ));
    assert!(matches!(
        service
            .schedule_program(USER.id, schedule(vec![(push, date(1)), (push, date(2))]))
            .await,
        Err(domain::ScheduleError::DuplicateDay)
    ));
    assert!(matches!(
        service
            .schedule_program(
                USER.id,
                domain::ScheduleRequest {
                    gym_id: Some(99.into()),
                    ..schedule(vec![(push, date(1))])
                }
            )
            .await,
        Err(domain::ScheduleError::GymNotFound)
    ));
}

#[tokio::test]
async fn test_program_ownership() {
    let service = domain::Service::new(sqlite().await);
    let name = |name| domain::Name::new(name).unwrap();

    let template = service
        .create_program(USER.id, name("Starter"), String::new(), String::new(), 4, 3, true)
        .await
        .unwrap();
    let own = service
        .create_program(USER_2.id, name("Mine"), String::new(), String::new(), 1, 2, true)
        .await
        .unwrap();

    assert!(template.is_template);
    assert!(!own.is_template, "only admins create templates");
    assert_eq!(own.weeks.len(), 1);
    assert_eq!(own.weeks[0].days.len(), 2);
    assert_eq!(
        service
            .get_programs(USER_2.id)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect::<BTreeSet<_>>(),
        BTreeSet::from([template.id, own.id])
    );
    assert!(matches!(
        service
            .modify_program(USER_2.id, template.id, Some(name("Taken")), None, None, None)
            .await,
        Err(domain::UpdateError::NotFound)
    ));
    assert!(matches!(
        service.get_program(USER.id, own.id).await,
        Err(domain::ReadError::NotFound)
    ));

    let copy = service
        .duplicate_program(USER_2.id, template.id)
        .await
        .unwrap();

    assert_eq!(copy.name.to_string(), "Starter (Copy)");
    assert_eq!(copy.user_id, USER_2.id);
    assert!(!copy.is_template);
    assert_ne!(copy.weeks[0].days[0].id, template.weeks[0].days[0].id);

    let modified = service
        .modify_program(USER_2.id, own.id, None, Some("Two days".into()), None, Some(true))
        .await
        .unwrap();

    assert_eq!(modified.description, "Two days");
    assert!(!modified.is_template);
}

async fn available(
    service: &domain::Service<Sqlite>,
    gym_id: domain::GymID,
) -> BTreeSet<domain::ExerciseID> {
    service
        .get_gym_exercises(USER.id, gym_id)
        .await
        .unwrap()
        .into_iter()
        .map(|ge| ge.exercise_id)
        .collect()
}

#[tokio::test]
async fn test_gym_exercise_sync() {
    let db = sqlite().await;
    let barbell = create_equipment(&db, &BARBELL).await;
    let service = domain::Service::new(db);
    let squat = service
        .create_exercise(
            USER.id,
            domain::Exercise {
                equipment: BTreeSet::from([barbell.id]),
                ..SQUAT.clone()
            },
        )
        .await
        .unwrap();
    let push_up = service
        .create_exercise(USER.id, PUSH_UP.clone())
        .await
        .unwrap();
    let gym = service
        .create_gym(
            USER.id,
            domain::Name::new("Garage").unwrap(),
            Some("  ".into()),
            false,
        )
        .await
        .unwrap();
    assert_eq!(gym.address, None);
    assert_eq!(available(&service, gym.id).await, BTreeSet::from([push_up.id]));

    let equipment = service
        .add_gym_equipment(USER.id, gym.id, gym_equipment(barbell.id))
        .await
        .unwrap();

    assert_eq!(available(&service, gym.id).await, BTreeSet::from([push_up.id, squat.id]));

    service
        .remove_gym_equipment(USER.id, gym.id, equipment.id)
        .await
        .unwrap();

    assert_eq!(available(&service, gym.id).await, BTreeSet::from([push_up.id]));
    assert!(matches!(
        service.get_gym_exercises(USER_2.id, gym.id).await,
        Err(domain::ReadError::NotFound)
    ));
}

#[tokio::test]
async fn test_workout_flow() {
    let db = sqlite().await;
    let squat = db.create_exercise(SQUAT.clone()).await.unwrap();
    let push_up = db.create_exercise(PUSH_UP.clone()).await.unwrap();
    let program = db.create_program(ppl(USER.id)).await.unwrap();
    let service = domain::Service::new(db);
    let domain::ScheduleOutcome::Scheduled(instance) = service
        .schedule_program(
            USER.id,
            domain::ScheduleRequest {
                program_id: program.id,
                name: None,
                gym_id: None,
                mappings: vec![
                    (program.weeks[0].days[0].id, date(4)),
                    (program.weeks[0].days[1].id, date(6)),
                ],
                force: false,
            },
        )
        .await
        .unwrap()
    else {
        panic!("expected scheduled program");
    };
    let day_id = instance.scheduled_days[0];
    let set = |set_number, weight| domain::LoggedSet {
        exercise_id: squat.id,
        set_number,
        reps: Some(5),
        weight: Some(weight),
        rpe: Some(8.0),
        notes: String::new(),
    };

    let session = service.start_workout(USER.id, day_id).await.unwrap();

    assert_eq!(session.scheduled_day_id, Some(day_id));
    assert_eq!(
        service.start_workout(USER.id, day_id).await.unwrap().id,
        session.id,
        "incomplete session is resumed"
    );

    service.log_set(USER.id, session.id, set(1, 100.0)).await.unwrap();
    service.log_set(USER.id, session.id, set(2, 95.0)).await.unwrap();
    let updated = service
        .log_set(USER.id, session.id, set(2, 100.0))
        .await
        .unwrap();

    assert_eq!(updated.weight, Some(100.0));
    assert!(matches!(
        service.log_set(USER.id, session.id, set(0, 100.0)).await,
        Err(domain::WorkoutError::InvalidSetNumber)
    ));
    assert_eq!(
        service
            .save_overall_rpe(USER.id, session.id, squat.id, domain::OverallRpe::Same)
            .await
            .unwrap(),
        2
    );
    assert!(matches!(
        service
            .save_overall_rpe(USER.id, session.id, push_up.id, domain::OverallRpe::Same)
            .await,
        Err(domain::WorkoutError::NoSetsLogged)
    ));

    let completed = service
        .complete_workout(USER.id, session.id, " Solid ".into())
        .await
        .unwrap();

    assert!(completed.is_completed);
    assert_eq!(completed.notes, "Solid");
    assert_eq!(completed.sets.len(), 2);
    assert!(
        service
            .get_calendar_events(USER.id)
            .await
            .unwrap()
            .into_iter()
            .find(|e| e.id == day_id)
            .unwrap()
            .is_completed
    );
    assert!(matches!(
        service.log_set(USER.id, session.id, set(3, 100.0)).await,
        Err(domain::WorkoutError::Completed)
    ));
    assert_ne!(
        service.start_workout(USER.id, day_id).await.unwrap().id,
        session.id
    );

    let stats = service.get_exercise_stats(USER.id).await.unwrap();

    assert_eq!(stats.len(), 1);
    assert_eq!(stats[0].exercise_id, squat.id);
    assert_eq!(stats[0].session_count, 1);
    assert_eq!(stats[0].total_sets, 2);
    assert_eq!(stats[0].max_weight, Some(100.0));

    let summary = service.get_summary(USER.id).await.unwrap();

    assert_eq!(summary.total_workouts, 1);
    assert_eq!(summary.total_days, 1);
    assert_eq!(summary.total_sets, 2);
    assert_eq!(summary.completed_programs, 0);
    assert_eq!(summary.top_exercises.len(), 1);

    let history = service.get_program_history(USER.id).await.unwrap();

    assert_eq!(history.len(), 1);
    assert_eq!(history[0].instance_id, instance.id);
    assert_eq!(history[0].total_days, 2);
    assert_eq!(history[0].completed_days, 1);
    assert_eq!(history[0].completion_percentage, 50.0);
    assert_eq!(history[0].start_date, date(4));
    assert_eq!(history[0].end_date, Some(date(6)));
}

#[tokio::test]
async fn test_record_body_metric() {
    let service = domain::Service::new(sqlite().await);
    let recorded_at = date(1).and_hms_opt(7, 0, 0).unwrap();

    service
        .record_body_metric(
            USER.id,
            domain::BodyMetric {
                weight: Some(80.5),
                body_fat: Some(18.0),
                ..domain::BodyMetric::new(USER_2.id, recorded_at)
            },
        )
        .await
        .unwrap();
    service
        .record_body_metric(
            USER.id,
            domain::BodyMetric {
                waist: Some(82.0),
                ..domain::BodyMetric::new(USER.id, recorded_at + Days::new(7))
            },
        )
        .await
        .unwrap();

    let profile = service.get_profile(USER.id).await.unwrap();

    assert_eq!(profile.current_weight, Some(80.5));
    assert_eq!(profile.current_body_fat, Some(18.0));
    assert_eq!(service.get_body_metrics(USER.id).await.unwrap().len(), 2);
    assert_eq!(service.get_body_metrics(USER_2.id).await.unwrap(), vec![]);
}
