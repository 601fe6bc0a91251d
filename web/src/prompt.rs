use minefront_core::PlayerIdentity;
use web_sys::HtmlInputElement;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub(crate) struct NamePromptProps {
    /// Prefilled when the player is editing an existing name
    #[prop_or_default]
    pub current: Option<PlayerIdentity>,
    pub on_submit: Callback<PlayerIdentity>,
}

pub(crate) enum Msg {
    Submit,
}

/// Modal dialog asking for the player's name. Blank submissions are
/// swallowed and the dialog stays up until something usable is entered.
pub(crate) struct NamePrompt {
    input: NodeRef,
}

impl Component for NamePrompt {
    type Message = Msg;
    type Properties = NamePromptProps;

    fn create(_ctx: &Context<Self>) -> Self {
        Self {
            input: NodeRef::default(),
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::Submit => {
                let Some(input) = self.input.cast::<HtmlInputElement>() else {
                    return false;
                };
                match PlayerIdentity::parse(&input.value()) {
                    Some(player) => ctx.props().on_submit.emit(player),
                    None => log::debug!("ignoring blank name submission"),
                }
                false
            }
        }
    }

    fn rendered(&mut self, ctx: &Context<Self>, first_render: bool) {
        if !first_render {
            return;
        }
        if let Some(input) = self.input.cast::<HtmlInputElement>() {
            if let Some(current) = &ctx.props().current {
                input.set_value(current.name());
            }
            let _ = input.focus();
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let onsubmit = ctx.link().callback(|e: SubmitEvent| {
            e.prevent_default();
            Msg::Submit
        });

        html! {
            <dialog id="name-prompt" open={true}>
                <article>
                    <h2>{"Welcome to Minefront!"}</h2>
                    <form {onsubmit}>
                        <input ref={self.input.clone()} type="text" placeholder="Your name"/>
                        <button type="submit">{"Play"}</button>
                    </form>
                </article>
            </dialog>
        }
    }
}
