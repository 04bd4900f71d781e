mod test_camera_joins_case_insensitive_room;
mod test_camera_recovers_after_host_restart;
mod test_camera_retries_until_host_appears;
mod test_leave_releases_identity;
