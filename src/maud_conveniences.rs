use maud::{Markup, Render, html};

pub const INPUT_CLASS: &str = "shadow appearance-none border rounded w-full py-2 px-3 leading-tight focus:outline-none focus:shadow-outline bg-gray-700 border-gray-600 disabled:opacity-50";

pub fn render_table<const N: usize>(titles: [&'static str; N], items: Vec<[Markup; N]>) -> Markup {
    html! {
        div class="overflow-x-auto" {
            table class="min-w-full bg-gray-800 rounded shadow-md" {
                thead class="bg-gray-700" {
                    tr {
                        @for title in titles {
                            th class="py-2 px-4 text-left font-semibold text-gray-300" {(title)}
                        }
                    }
                }
                tbody {
                    @for row in items {
                        tr class="hover:bg-gray-700" {
                            @for col in row {
                                td class="py-2 px-4 border-b border-gray-600 text-gray-200" {(col)}
                            }
                        }
                    }
                }
            }
        }
    }
}

pub fn title(s: impl Render) -> Markup {
    html! {
        h1 class="text-2xl font-semibold mb-4" {(s)}
    }
}

pub fn subtitle(s: impl Render) -> Markup {
    html! {
        p class="text-sm text-gray-400 mb-4" {(s)}
    }
}

pub fn form_element(id: &'static str, label: &'static str, error: Option<&str>, input: Markup) -> Markup {
    html! {
        div class="mb-4" {
            label for=(id) class="block text-sm font-bold mb-2 text-gray-300" {(label)}
            (input)
            @if let Some(error) = error {
                p class="text-red-400 text-xs italic mt-1" {(error)}
            }
        }
    }
}

pub fn modal(body: Markup) -> Markup {
    html! {
        div class="fixed inset-0 bg-black/60 flex items-center justify-center z-40" {
            div class="bg-gray-800 p-8 rounded shadow-md max-w-2xl w-full" {
                (body)
            }
        }
    }
}

pub fn stat_card(label: &'static str, value: usize) -> Markup {
    html! {
        div class="bg-gray-800 rounded shadow-md p-6" {
            div class="text-sm font-medium text-gray-400 mb-1" {(label)}
            div class="text-3xl font-bold" {(value)}
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

/// A transient toast, swapped into `#toasts` out-of-band.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub description: String,
}

impl Notification {
    pub fn success(description: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Success,
            description: description.into(),
        }
    }

    pub fn error(description: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Error,
            description: description.into(),
        }
    }
}

impl Render for Notification {
    fn render(&self) -> Markup {
        let (heading, class) = match self.kind {
            NotificationKind::Success => (
                "Success!",
                "bg-green-100 border border-green-400 text-green-700",
            ),
            NotificationKind::Error => ("Error", "bg-red-100 border border-red-400 text-red-700"),
        };

        html! {
            div hx-swap-oob="beforeend:#toasts" {
                div class={(class) " px-4 py-3 rounded relative shadow-md max-w-sm"} role="alert" {
                    strong class="font-bold" {(heading)}
                    " "
                    span {(self.description)}
                    button type="button" class="absolute top-1 right-2 font-bold" onclick="this.parentElement.remove()" {"×"}
                }
            }
        }
    }
}
