// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Proptest strategies for other crates' tests.

use proptest::prelude::*;

use crate::job::JobRecipe;
use crate::recipe::{Recipe, Step};
use crate::scope::JobType;

fn ident() -> impl Strategy<Value = String> {
    "[a-z0-9]{1,8}"
}

pub fn arb_step() -> impl Strategy<Value = Step> {
    (1u32..5, ident(), ident(), prop_oneof![Just("now"), Just("in.1.seconds"), Just("every.2.minutes")])
        .prop_map(|(n, name, image, trigger)| {
            Step::builder().step(n).name(name).image(format!("{image}:latest")).trigger(trigger).build()
        })
}

pub fn arb_job_recipe() -> impl Strategy<Value = JobRecipe> {
    (
        ident(),
        ident(),
        1u32..20,
        prop_oneof![Just("individual"), Just("shared")],
        proptest::collection::vec(arb_step(), 1..4),
        proptest::collection::vec("[A-Z]{1,4}=[a-z]{0,4}", 0..4),
    )
        .prop_map(|(uuid, user, page, scope, steps, env)| {
            JobRecipe::builder()
                .job_type(JobType::App)
                .uuid(uuid)
                .user_id(user)
                .page_id(page.to_string())
                .scope(scope)
                .env(env)
                .recipe(Recipe { name: "prop".into(), steps, ..Default::default() })
                .build()
        })
}
