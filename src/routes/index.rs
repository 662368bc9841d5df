use crate::{
    data::directory::{Directory, ViewFilter},
    maud_conveniences::{INPUT_CLASS, Notification, stat_card},
    routes::{STUDENTS_CHANGED, student_table::render_student_table},
    state::RosterState,
};
use axum::extract::{Query, State};
use maud::{Markup, html};

pub async fn get_index_route(State(state): State<RosterState>) -> Markup {
    state.render(html! {
        header class="border-b border-gray-700 bg-gray-800/50 sticky top-0 z-10" {
            div class="container mx-auto px-4 py-6 flex items-center justify-between" {
                div {
                    h1 class="text-3xl font-bold" {"Student Roster"}
                    p class="text-sm text-gray-400" {"Academic records management"}
                }
                button class="bg-blue-600 hover:bg-blue-800 font-bold py-2 px-4 rounded" hx-get="/internal/students/form" hx-target="#modal" {
                    "Add Student"
                }
            }
        }
        main class="container mx-auto px-4 py-8" {
            div id="directory" hx-get="/internal/students/reload" hx-trigger="load" {
                (render_loading())
            }
        }
    })
}

fn render_loading() -> Markup {
    html! {
        div class="text-center py-12" {
            p class="text-gray-400" {"Loading..."}
        }
    }
}

fn course_select(directory: &Directory, filter: &ViewFilter, out_of_band: bool) -> Markup {
    let selected = filter.course.as_value();
    // a course can vanish after a reload while it's still the active filter
    let stale_selection = !selected.is_empty() && !directory.courses().iter().any(|c| c == selected);

    html! {
        select id="course_filter" name="course" hx-swap-oob=[out_of_band.then_some("true")] class=(INPUT_CLASS) {
            option value="" selected[selected.is_empty()] {"All courses"}
            @for course in directory.courses() {
                option value=(course) selected[course == selected] {(course)}
            }
            @if stale_selection {
                option value=(selected) selected {(selected)}
            }
        }
    }
}

fn render_filters(directory: &Directory, filter: &ViewFilter) -> Markup {
    html! {
        form id="filters" hx-get="/internal/students" hx-target="#listing" hx-trigger="input delay:300ms, change, submit" class="bg-gray-800 rounded shadow-md p-6 mb-6 grid gap-4 md:grid-cols-2" {
            input type="search" name="search" value=(filter.search) placeholder="Search by name or enrollment number..." class=(INPUT_CLASS);
            (course_select(directory, filter, false))
        }
    }
}

/// Counters and table for the current filter. Pure: never touches the store.
pub fn render_listing(directory: &Directory, filter: &ViewFilter) -> Markup {
    if directory.is_loading() {
        return render_loading();
    }

    let summary = directory.summary(filter);
    let students = directory.filtered(filter);

    html! {
        div class="grid gap-4 md:grid-cols-3 mb-6" {
            (stat_card("Total Students", summary.total))
            (stat_card("Active Courses", summary.courses))
            (stat_card("Results", summary.results))
        }
        (render_student_table(&students))
    }
}

pub fn render_directory(directory: &Directory, filter: &ViewFilter) -> Markup {
    html! {
        (render_filters(directory, filter))
        div id="listing" hx-get="/internal/students" hx-trigger={(STUDENTS_CHANGED) " from:body"} hx-include="#filters" {
            (render_listing(directory, filter))
        }
    }
}

/// The mount fetch: pull everything from the store, then render from the fresh copy.
pub async fn internal_reload_students(
    State(state): State<RosterState>,
    Query(filter): Query<ViewFilter>,
) -> Markup {
    let failure = match state.reload_directory().await {
        Ok(()) => None,
        Err(e) => {
            error!(?e, "Unable to load students");
            Some(Notification::error(e.user_message()))
        }
    };

    let directory = state.directory().await;
    html! {
        (render_directory(&directory, &filter))
        @if let Some(failure) = failure {
            (failure)
        }
    }
}

pub async fn internal_get_students(
    State(state): State<RosterState>,
    Query(filter): Query<ViewFilter>,
) -> Markup {
    let directory = state.directory().await;
    html! {
        (render_listing(&directory, &filter))
        (course_select(&directory, &filter, true))
    }
}
