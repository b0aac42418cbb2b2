use blueprint_intake::engine::{
    apply_reply, email_declined, extract_fragment, feature_count_range, merge, next_step,
    requirements_block, PolicyConfig, Step,
};
use blueprint_intake::models::{
    CoreEntry, CoreField, FeatureItem, Message, RequirementsSnapshot,
};
use speculate2::speculate;

fn snapshot_with(entries: &[(CoreField, &str)]) -> RequirementsSnapshot {
    RequirementsSnapshot {
        project_core: entries
            .iter()
            .map(|(key, value)| CoreEntry {
                key: *key,
                value: (*value).to_string(),
            })
            .collect(),
        ..Default::default()
    }
}

fn complete_snapshot(budget: &str) -> RequirementsSnapshot {
    snapshot_with(&[
        (CoreField::Name, "Maya"),
        (CoreField::Purpose, "fitness tracking for yoga"),
        (CoreField::Region, "Europe"),
        (CoreField::Platform, "mobile app (iOS)"),
        (CoreField::Email, "maya@example.com"),
        (CoreField::Budget, budget),
    ])
}

speculate! {
    before {
        let config = PolicyConfig::default();
    }

    describe "extractor and merger" {
        it "cold start parses a minimal data block and asks for purpose next" {
            let fragment = extract_fragment("Requirements:\nPROJECT CORE\n- Name: Ada\n");
            let merged = merge(&RequirementsSnapshot::default(), &fragment);

            assert_eq!(merged.project_core, vec![CoreEntry {
                key: CoreField::Name,
                value: "Ada".to_string(),
            }]);
            assert!(merged.target_audience.is_empty());
            assert!(merged.features.is_empty());
            assert_eq!(next_step(&merged, 2, false, &config), Step::AwaitPurpose);
        }

        it "merging the same fragment twice equals merging once" {
            let existing = snapshot_with(&[(CoreField::Name, "Ada")]);
            let fragment = extract_fragment(
                "PROJECT CORE\n- Purpose: ride sharing\nTARGET AUDIENCE\n- Audience: commuters\nFEATURES\n- Route planning\n",
            );

            let once = merge(&existing, &fragment);
            let twice = merge(&once, &fragment);

            assert_eq!(once, twice);
        }

        it "keeps at most one entry per canonical key with last write winning in place" {
            let existing = snapshot_with(&[
                (CoreField::Name, "Ada"),
                (CoreField::Budget, "small"),
                (CoreField::Email, "ada@example.com"),
            ]);
            let fragment = extract_fragment("PROJECT CORE\n- Budget: $5000\n");

            let merged = merge(&existing, &fragment);

            let budget_entries: Vec<_> = merged
                .project_core
                .iter()
                .filter(|e| e.key == CoreField::Budget)
                .collect();
            assert_eq!(budget_entries.len(), 1);
            assert_eq!(merged.project_core[1].key, CoreField::Budget);
            assert_eq!(merged.project_core[1].value, "$5000");
        }

        it "a fragment repeating a feature text yields a single feature entry" {
            let fragment = extract_fragment(
                "FEATURES\n- Push notifications\n- Push notifications\n",
            );
            let merged = merge(&RequirementsSnapshot::default(), &fragment);

            assert_eq!(merged.features.len(), 1);
            assert_eq!(merged.features[0].text, "Push notifications");
        }

        it "a reply without a data block leaves the snapshot unchanged" {
            let existing = snapshot_with(&[(CoreField::Name, "Ada")]);
            let fragment = extract_fragment("Great, could you tell me a bit more about that?");

            assert!(fragment.is_empty());
            assert_eq!(merge(&existing, &fragment), existing);
        }
    }

    describe "prompt formatter" {
        it "format then extract then merge reproduces the snapshot" {
            let snapshot = RequirementsSnapshot {
                project_core: vec![
                    CoreEntry { key: CoreField::Name, value: "Maya".to_string() },
                    CoreEntry { key: CoreField::Platform, value: "mobile app (iOS)".to_string() },
                ],
                target_audience: vec!["yoga students".to_string(), "trainers".to_string()],
                features: vec![
                    FeatureItem::new("Push notifications"),
                    FeatureItem::new("Offline mode"),
                ],
            };

            let block = requirements_block(&snapshot);
            let fragment = extract_fragment(&block);
            let merged = merge(&snapshot, &fragment);

            assert_eq!(merged, snapshot);
        }

        it "empty audience and feature sections are omitted and still round trip" {
            let snapshot = snapshot_with(&[(CoreField::Name, "Maya")]);

            let block = requirements_block(&snapshot);
            assert!(!block.contains("TARGET AUDIENCE"));
            assert!(!block.contains("FEATURES"));

            let merged = merge(&snapshot, &extract_fragment(&block));
            assert_eq!(merged, snapshot);
        }
    }

    describe "step policy" {
        it "walks the wizard order field by field" {
            let mut snapshot = RequirementsSnapshot::default();
            assert_eq!(next_step(&snapshot, 1, false, &config), Step::AwaitName);

            for (field, value, expected) in [
                (CoreField::Name, "Maya", Step::AwaitPurpose),
                (CoreField::Purpose, "fitness tracking", Step::AwaitRegion),
                (CoreField::Region, "Europe", Step::AwaitPlatform),
                (CoreField::Platform, "web", Step::AwaitEmail),
                (CoreField::Email, "maya@example.com", Step::AwaitBudget),
                (CoreField::Budget, "$5000", Step::SuggestFeatures),
            ] {
                snapshot.project_core.push(CoreEntry {
                    key: field,
                    value: value.to_string(),
                });
                assert_eq!(next_step(&snapshot, 1, false, &config), expected);
            }
        }

        it "an os-less mobile platform triggers the follow-up question" {
            let snapshot = snapshot_with(&[
                (CoreField::Name, "Maya"),
                (CoreField::Purpose, "fitness tracking"),
                (CoreField::Region, "Europe"),
                (CoreField::Platform, "mobile app"),
            ]);
            assert_eq!(
                next_step(&snapshot, 1, false, &config),
                Step::AwaitPlatformDetail
            );
        }

        it "a platform naming an os skips straight to the email question" {
            let snapshot = snapshot_with(&[
                (CoreField::Name, "Maya"),
                (CoreField::Purpose, "fitness tracking"),
                (CoreField::Region, "Europe"),
                (CoreField::Platform, "mobile app (iOS)"),
            ]);
            assert_eq!(next_step(&snapshot, 1, false, &config), Step::AwaitEmail);
        }

        it "a refusal while the email question is pending latches past it" {
            let snapshot = snapshot_with(&[
                (CoreField::Name, "Maya"),
                (CoreField::Purpose, "fitness tracking"),
                (CoreField::Region, "Europe"),
                (CoreField::Platform, "web"),
            ]);
            let messages = vec![Message::user("I'd rather not share that")];

            assert!(email_declined(&snapshot, &messages, &config));
            assert_eq!(next_step(&snapshot, 1, true, &config), Step::AwaitBudget);
        }

        it "a refusal word answering the platform question does not skip the email step" {
            let snapshot = snapshot_with(&[
                (CoreField::Name, "Maya"),
                (CoreField::Purpose, "fitness tracking"),
                (CoreField::Region, "Europe"),
            ]);
            let messages = vec![Message::user("Android only, no preference beyond that")];

            // Platform is the pending question, so the "no" is not an email decline.
            assert!(!email_declined(&snapshot, &messages, &config));

            let outcome = apply_reply(
                &snapshot,
                &messages,
                "Noted!\nRequirements:\nPROJECT CORE\n- Name: Maya\n- Purpose: fitness tracking\n- Region: Europe\n- Platform: mobile app (Android)\n",
                false,
                &config,
            );

            assert_eq!(outcome.snapshot.core_value(CoreField::Platform), Some("mobile app (Android)"));
            assert_eq!(outcome.step, Step::AwaitEmail);
        }

        it "a small budget yields the 2 to 4 feature tier" {
            let snapshot = complete_snapshot("$500");
            assert_eq!(next_step(&snapshot, 1, false, &config), Step::SuggestFeatures);
            assert_eq!(feature_count_range("$500"), (2, 4));
        }

        it "the proposal ceiling overrides every missing field" {
            assert_eq!(
                next_step(&RequirementsSnapshot::default(), 20, false, &config),
                Step::ProposeNextSteps
            );
            assert_eq!(
                next_step(&complete_snapshot("$5000"), 25, false, &config),
                Step::ProposeNextSteps
            );
        }
    }

    describe "turn loop" {
        it "apply_reply folds the reply and reports the next step" {
            let snapshot = snapshot_with(&[(CoreField::Name, "Maya")]);
            let messages = vec![
                Message::user("I want a fitness app"),
                Message::assistant("Nice to meet you, Maya!"),
                Message::user("It is for yoga fans"),
            ];

            let outcome = apply_reply(
                &snapshot,
                &messages,
                "Got it!\nRequirements:\nPROJECT CORE\n- Name: Maya\n- Purpose: yoga tracking\n",
                false,
                &config,
            );

            assert_eq!(outcome.snapshot.core_value(CoreField::Purpose), Some("yoga tracking"));
            assert_eq!(outcome.step, Step::AwaitRegion);
            assert!(!outcome.proposal_offered);
        }

        it "apply_reply raises the proposal flag at the message ceiling" {
            let messages: Vec<Message> = (0..20).map(|i| Message::user(format!("message {i}"))).collect();

            let outcome = apply_reply(
                &RequirementsSnapshot::default(),
                &messages,
                "Shall we prepare a proposal?",
                false,
                &config,
            );

            assert_eq!(outcome.step, Step::ProposeNextSteps);
            assert!(outcome.proposal_offered);
        }
    }
}
