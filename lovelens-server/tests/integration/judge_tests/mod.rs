mod test_judge_failure_shows_fallback;
mod test_judge_runs_one_at_a_time;
mod test_judge_without_feed;
